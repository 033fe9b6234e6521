use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors that stop a run before any test executes.
///
/// Failures inside tests never show up here, they are reported through the
/// counters and the [`FailureLog`](crate::log::FailureLog).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid filter pattern {pattern:?}")]
    InvalidFilter {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to walk test directory {}", root.display())]
    Discovery {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
