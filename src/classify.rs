//! Failure classification for leaves and hooks.
//!
//! Running a leaf can go wrong in three ways:
//! - an assertion fails (a panic raised by one of the `assert!` macros),
//! - some other panic happens, Rust's way of signalling a runtime fault,
//! - the leaf returns an [`Exception`].
//!
//! [`catch`] executes test code and hands back what was raised, [`classify`]
//! turns that into a [`Failure`] attributed to the most useful source location.
//! Assertions are attributed to the asserting line. For the other two kinds the
//! captured stack is walked from the innermost frame outwards and the first
//! frame outside of library code wins, since frames inside the toolchain or
//! dependencies rarely help when debugging a test.

use std::{
    any::Any,
    borrow::Cow,
    fmt::{self, Display},
    panic::{AssertUnwindSafe, catch_unwind},
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;

use crate::{
    assertion::AssertionFailed,
    capture::{self, PanicRecord},
    definition::{Exception, LeafResult},
    stack::{Frame, SourceLocation},
};

/// Something raised while running test code.
#[derive(Debug)]
pub enum Raised {
    Panic {
        payload: Box<dyn Any + Send + 'static>,
        record: Option<PanicRecord>,
    },
    Exception(Exception),
}

/// Run test code, turning panics and returned errors into [`Raised`].
///
/// Must be called inside a [`WatchGuard`](crate::capture::WatchGuard) for panic
/// locations and stacks to be recorded.
pub fn catch<F: FnOnce() -> LeafResult>(f: F) -> Result<(), Raised> {
    match catch_panic(f)? {
        LeafResult(Ok(())) => Ok(()),
        LeafResult(Err(exception)) => Err(Raised::Exception(exception)),
    }
}

/// Run code that may only panic, like a hook or a suite body.
pub fn catch_panic<T>(f: impl FnOnce() -> T) -> Result<T, Raised> {
    let result = catch_unwind(AssertUnwindSafe(f));
    let record = capture::take_panic_record();
    result.map_err(|payload| Raised::Panic { payload, record })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Assertion,
    Runtime,
    Exception,
}

/// A classified failure, ready to be shown and logged.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Failure {
    pub kind: FailureKind,
    pub class: Cow<'static, str>,
    pub message: String,
    pub location: SourceLocation,
    pub test_path: PathBuf,
}

impl Failure {
    /// The failure as a single line with semantic color tags.
    ///
    /// The attributed file is shown relative to `working_dir`.
    pub fn render(&self, working_dir: &Path) -> String {
        let file = self.location.relative_to(working_dir).display();
        let line = self.location.line;
        let test = self.test_path.display();
        match self.kind {
            FailureKind::Assertion => format!(
                "<darkGray>{} <gray>in <darkGray>{file} <gray>on line <darkGray>{line} <gray>of <darkGray>{test}",
                self.message
            ),
            FailureKind::Runtime => format!(
                "<gray>Error <darkGray>{} <gray>with message <darkGray>{} <gray>in <darkGray>{file} <gray>on line <darkGray>{line} <gray>of <darkGray>{test}",
                self.class, self.message
            ),
            FailureKind::Exception => format!(
                "<gray>Caught exception <darkGray>{} <gray>with message <darkGray>{} <gray>in <darkGray>{file} <gray>on line <darkGray>{line} <gray>of <darkGray>{test}",
                self.class, self.message
            ),
        }
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} {}: {} at {}",
            self.kind, self.class, self.message, self.location
        )
    }
}

/// Decides which stack frames belong to library code.
///
/// A frame is library code when its file path, with `\` normalized to `/`,
/// contains one of the markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryFrames {
    markers: Vec<Cow<'static, str>>,
}

impl Default for LibraryFrames {
    fn default() -> Self {
        Self {
            markers: vec![
                "/rustc/".into(),
                "/.cargo/registry/".into(),
                "/.cargo/git/".into(),
                "/vendor/".into(),
                "/library/std/".into(),
                "/library/core/".into(),
                "/library/alloc/".into(),
            ],
        }
    }
}

impl LibraryFrames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend_markers<M: Into<Cow<'static, str>>>(
        mut self,
        markers: impl IntoIterator<Item = M>,
    ) -> Self {
        self.markers.extend(markers.into_iter().map(Into::into));
        self
    }

    pub fn is_library(&self, file: &Path) -> bool {
        let file = file.to_string_lossy().replace('\\', "/");
        self.markers.iter().any(|marker| file.contains(marker.as_ref()))
    }

    /// The innermost frame with a location outside of library code.
    pub fn first_user_frame<'f>(&self, stack: &'f [Frame]) -> Option<&'f SourceLocation> {
        stack
            .iter()
            .filter_map(|frame| frame.location.as_ref())
            .find(|location| !self.is_library(&location.file))
    }
}

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Strip the fixed `assertion failed:` style prefix and trailing delimiters.
pub fn assertion_message(raw: &str) -> String {
    let collapsed = WHITESPACE.replace_all(raw.trim(), " ");
    let text = collapsed.as_ref();
    let lower = text.to_ascii_lowercase();
    let rest = if lower.starts_with("assertion failed:") {
        &text["assertion failed:".len()..]
    } else if lower.starts_with("assert(") && text.ends_with(')') {
        &text["assert(".len()..text.len() - 1]
    } else if lower.starts_with("assertion ") {
        &text["assertion ".len()..]
    } else {
        text
    };
    rest.trim().trim_end_matches(['.', ';']).to_string()
}

/// Messages of std's `assert!` and `assert_eq!`/`assert_ne!` panics.
fn is_assertion_message(message: &str) -> bool {
    let lower = message.trim_start().to_ascii_lowercase();
    lower.starts_with("assertion failed:") || lower.starts_with("assertion `left")
}

/// Turn what a leaf raised into a [`Failure`].
pub fn classify(raised: Raised, test_path: &Path, library: &LibraryFrames) -> Failure {
    let failure = |kind, class: Cow<'static, str>, message, location| Failure {
        kind,
        class,
        message,
        location,
        test_path: test_path.to_path_buf(),
    };

    match raised {
        Raised::Exception(exception) => {
            let location = library
                .first_user_frame(exception.stack())
                .unwrap_or(exception.location())
                .clone();
            failure(
                FailureKind::Exception,
                Cow::Owned(exception.class().to_string()),
                exception.message().to_string(),
                location,
            )
        }
        Raised::Panic { payload, record } => {
            let payload = match payload.downcast::<AssertionFailed>() {
                Ok(assertion) => {
                    let AssertionFailed { message, location } = *assertion;
                    return failure(
                        FailureKind::Assertion,
                        "AssertionFailed".into(),
                        assertion_message(&message),
                        location,
                    );
                }
                Err(payload) => payload,
            };

            let message = capture::payload_as_string(payload.as_ref());
            let raised_at = record.as_ref().and_then(|record| record.location.clone());
            if is_assertion_message(&message) {
                return failure(
                    FailureKind::Assertion,
                    "AssertionFailed".into(),
                    assertion_message(&message),
                    raised_at.unwrap_or_else(SourceLocation::unknown),
                );
            }

            let location = record
                .as_ref()
                .and_then(|record| library.first_user_frame(&record.stack))
                .cloned()
                .or(raised_at)
                .unwrap_or_else(SourceLocation::unknown);
            failure(FailureKind::Runtime, "panic".into(), message, location)
        }
    }
}
