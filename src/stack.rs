//! Call stacks and source locations.
//!
//! Rust does not hand out structured stack frames on stable, so the stack is
//! captured with [`Backtrace::force_capture`] and read back from its display
//! form. Only frames that resolved to a file and line are useful for
//! attribution, the rest are kept so the leading machinery frames can be skipped
//! by symbol name.

use std::{
    backtrace::Backtrace,
    fmt::{self, Display},
    panic::Location,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;

/// A file and line in source code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Location used when nothing better is known.
    pub fn unknown() -> Self {
        Self::new("<unknown>", 0)
    }

    /// The file path relative to `base`, or the path itself when it is not below `base`.
    ///
    /// A leading `./`, as printed for paths relative to the build directory, is dropped.
    pub fn relative_to(&self, base: &Path) -> &Path {
        let file = self.file.strip_prefix(".").unwrap_or(&self.file);
        file.strip_prefix(base).unwrap_or(file)
    }
}

impl From<&Location<'_>> for SourceLocation {
    fn from(value: &Location<'_>) -> Self {
        Self::new(value.file(), value.line())
    }
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// A single frame of a captured call stack, innermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub symbol: String,
    pub location: Option<SourceLocation>,
}

static SYMBOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+: (?P<symbol>.+)$").unwrap());

static LOCATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+at (?P<file>.+):(?P<line>\d+):\d+$").unwrap());

/// Symbol prefixes of frames that belong to the panic and backtrace machinery.
const MACHINERY: &[&str] = &[
    "std::",
    "core::",
    "alloc::",
    "<std::",
    "<core::",
    "<alloc::",
    "rust_begin_unwind",
    "__rust",
    "backtrace::",
];

/// Symbol prefixes of this crate's own raising helpers.
const OWN: &[&str] = &[
    concat!(env!("CARGO_CRATE_NAME"), "::stack::"),
    concat!(env!("CARGO_CRATE_NAME"), "::capture::"),
    concat!(env!("CARGO_CRATE_NAME"), "::assertion::"),
    concat!(env!("CARGO_CRATE_NAME"), "::definition::Exception"),
    concat!("<", env!("CARGO_CRATE_NAME"), "::definition::Exception"),
];

/// Capture the current call stack.
///
/// Frames of the capturing machinery itself are dropped, so the first frame is
/// the code that raised.
pub fn capture() -> Vec<Frame> {
    let backtrace = Backtrace::force_capture();
    trim_machinery(parse(&backtrace.to_string()))
}

pub(crate) fn parse(text: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();
    for line in text.lines() {
        if let Some(caps) = LOCATION_RE.captures(line) {
            if let Some(frame) = frames.last_mut()
                && frame.location.is_none()
                && let Ok(number) = caps["line"].parse()
            {
                frame.location = Some(SourceLocation::new(&caps["file"], number));
            }
        } else if let Some(caps) = SYMBOL_RE.captures(line) {
            frames.push(Frame {
                symbol: caps["symbol"].to_string(),
                location: None,
            });
        }
    }
    frames
}

pub(crate) fn trim_machinery(frames: Vec<Frame>) -> Vec<Frame> {
    let is_machinery = |frame: &Frame| {
        MACHINERY
            .iter()
            .chain(OWN.iter())
            .any(|prefix| frame.symbol.starts_with(prefix))
    };
    frames.into_iter().skip_while(is_machinery).collect()
}
