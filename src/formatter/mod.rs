//! Progress output for test runs.
//!
//! The [`ProgressFormatter`] writes everything a run prints: suite descriptions,
//! in place progress for each leaf, failure messages and the final conclusion.
//! Text is composed with semantic color tags (see [`color`]) and rendered right
//! before it is written.
//!
//! Formatting errors never abort a run. They are collected and handed back in
//! the [`Report`](crate::Report), each named after the formatter call that
//! produced it.

use std::io;

pub mod color;

mod progress;
pub use progress::*;

mod spinner;

/// Two spaces per nesting level.
pub const INDENT: &str = "  ";

pub(crate) fn indent(level: usize) -> String {
    INDENT.repeat(level)
}

/// Move the cursor `columns` to the left and reset all attributes.
pub(crate) fn backspace(columns: usize) -> String {
    format!("\x1b[{columns}D\x1b[0m")
}

pub type FmtErrors = Vec<(&'static str, io::Error)>;

pub(crate) trait PushOnError {
    fn push_on_error(&mut self, named: (&'static str, io::Result<()>));
}

impl PushOnError for FmtErrors {
    fn push_on_error(&mut self, (name, result): (&'static str, io::Result<()>)) {
        if let Err(err) = result {
            tracing::debug!(call = name, error = %err, "formatter call failed");
            self.push((name, err));
        }
    }
}

macro_rules! named_fmt {
    ($formatter:ident.$call:ident($($args:tt)*)) => {
        (::std::stringify!($call), $formatter.$call($($args)*))
    };
    ($formatter:ident.$field:ident.$call:ident($($args:tt)*)) => {
        (::std::stringify!($call), $formatter.$field.$call($($args)*))
    };
    ($owner:ident.$env:ident.$field:ident.$call:ident($($args:tt)*)) => {
        (::std::stringify!($call), $owner.$env.$field.$call($($args)*))
    };
}

pub(crate) use named_fmt;
