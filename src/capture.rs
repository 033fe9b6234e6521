//! Output capture and panic recording while test code runs.
//!
//! Rust offers no stable way to redirect the process' stdout for a single
//! closure. Instead this crate exports its own [`print!`](crate::print),
//! [`println!`](crate::println), [`eprint!`](crate::eprint),
//! [`eprintln!`](crate::eprintln) and [`dbg!`](crate::dbg) macros. Test code
//! that imports them writes into a thread local buffer while a leaf is
//! running, and straight to the terminal otherwise.
//!
//! The panic hook installed by [`install_panic_hook`] records where a panic was
//! raised together with its call stack, but only for threads currently inside a
//! [`WatchGuard`]. Every other panic is forwarded to the previously installed
//! hook.

use std::{
    any::Any,
    cell::{Cell, RefCell},
    fmt,
    io::{self, Write},
    mem,
    panic::{self, PanicHookInfo},
    sync::{LazyLock, Once},
};

use regex::Regex;

use crate::stack::{self, Frame, SourceLocation};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputCapture {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl OutputCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.stdout.clear();
        self.stderr.clear();
    }

    pub fn take(&mut self) -> Self {
        let stdout = mem::take(&mut self.stdout);
        let stderr = mem::take(&mut self.stderr);
        Self { stdout, stderr }
    }

    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }

    /// Both streams as text, escape sequences removed and trailing whitespace trimmed.
    pub fn cleaned(&self) -> String {
        let mut raw = String::from_utf8_lossy(&self.stdout).into_owned();
        raw.push_str(&String::from_utf8_lossy(&self.stderr));
        clean_output(&raw)
    }
}

static ESCAPES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x1b\[[\d;]*m").unwrap());

/// Remove color escape sequences and trailing whitespace from captured output.
pub fn clean_output(raw: &str) -> String {
    ESCAPES.replace_all(raw.trim_end(), "").into_owned()
}

/// What a panic left behind for the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicRecord {
    pub message: String,
    pub location: Option<SourceLocation>,
    pub stack: Vec<Frame>,
}

thread_local! {
    pub static OUTPUT_CAPTURE: RefCell<OutputCapture> = RefCell::new(OutputCapture::new());
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static WATCHING: Cell<bool> = const { Cell::new(false) };
    static LAST_PANIC: RefCell<Option<PanicRecord>> = const { RefCell::new(None) };
}

/// Convert a panic payload into a string.
///
/// This matches the common payload types produced by `panic!` (`&'static str` and `String`).
pub fn payload_as_string(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&'static str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("Box<dyn Any>"))
}

/// Install the recording panic hook for the whole process.
///
/// Calling this more than once has no further effect.
pub fn install_panic_hook() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| {
            match WATCHING.get() {
                true => record_panic(info),
                false => previous(info),
            }
        }));
    });
}

fn record_panic(info: &PanicHookInfo<'_>) {
    let record = PanicRecord {
        message: payload_as_string(info.payload()),
        location: info.location().map(SourceLocation::from),
        stack: stack::capture(),
    };
    LAST_PANIC.with_borrow_mut(|last| *last = Some(record));
}

/// Take the record of the last panic on this thread, if any.
pub fn take_panic_record() -> Option<PanicRecord> {
    LAST_PANIC.with_borrow_mut(Option::take)
}

/// Whether output written through this crate's print macros is captured right now.
pub fn capturing() -> bool {
    CAPTURING.get()
}

/// Marks the current thread as running test code until dropped.
///
/// While alive, panics on this thread are recorded instead of printed and, if
/// requested, output is captured.
#[derive(Debug)]
pub struct WatchGuard {
    capturing: bool,
    watching: bool,
}

impl WatchGuard {
    pub fn enter(capture_output: bool) -> Self {
        install_panic_hook();
        let guard = Self {
            capturing: CAPTURING.replace(capture_output),
            watching: WATCHING.replace(true),
        };
        OUTPUT_CAPTURE.with_borrow_mut(OutputCapture::clear);
        LAST_PANIC.with_borrow_mut(|last| *last = None);
        guard
    }

    /// Leave the guarded section and hand out everything captured inside it.
    pub fn finish(self) -> OutputCapture {
        OUTPUT_CAPTURE.with_borrow_mut(OutputCapture::take)
    }
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        CAPTURING.set(self.capturing);
        WATCHING.set(self.watching);
    }
}

#[doc(hidden)]
pub fn write_stdout(args: fmt::Arguments<'_>) {
    match capturing() {
        true => OUTPUT_CAPTURE.with_borrow_mut(|capture| {
            capture
                .stdout
                .write_fmt(args)
                .expect("infallible for Vec<u8>")
        }),
        false => {
            let _ = io::stdout().write_fmt(args);
        }
    }
}

#[doc(hidden)]
pub fn write_stderr(args: fmt::Arguments<'_>) {
    match capturing() {
        true => OUTPUT_CAPTURE.with_borrow_mut(|capture| {
            capture
                .stderr
                .write_fmt(args)
                .expect("infallible for Vec<u8>")
        }),
        false => {
            let _ = io::stderr().write_fmt(args);
        }
    }
}

#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {{
        $crate::capture::write_stdout(::std::format_args!($($arg)*));
    }};
}

#[macro_export]
macro_rules! println {
    () => {
        $crate::print!("\n")
    };
    ($($arg:tt)*) => {{
        $crate::capture::write_stdout(::std::format_args!("{}\n", ::std::format_args!($($arg)*)));
    }};
}

#[macro_export]
macro_rules! eprint {
    ($($arg:tt)*) => {{
        $crate::capture::write_stderr(::std::format_args!($($arg)*));
    }};
}

#[macro_export]
macro_rules! eprintln {
    () => {
        $crate::eprint!("\n")
    };
    ($($arg:tt)*) => {{
        $crate::capture::write_stderr(::std::format_args!("{}\n", ::std::format_args!($($arg)*)));
    }};
}

#[macro_export]
macro_rules! dbg {
    () => {
        $crate::eprintln!("[{}:{}:{}]", ::std::file!(), ::std::line!(), ::std::column!())
    };
    ($val:expr $(,)?) => {
        match $val {
            tmp => {
                $crate::eprintln!(
                    "[{}:{}:{}] {} = {:#?}",
                    ::std::file!(),
                    ::std::line!(),
                    ::std::column!(),
                    ::std::stringify!($val),
                    &&tmp as &dyn ::std::fmt::Debug,
                );
                tmp
            }
        }
    };
    ($($val:expr),+ $(,)?) => {
        ($($crate::dbg!($val)),+,)
    };
}
