use std::{path::PathBuf, time::Duration};

use crate::{formatter::FmtErrors, node::Counters};

/// The result of a whole run.
#[derive(Debug)]
#[non_exhaustive]
pub struct Report {
    pub counters: Counters,
    /// Every logged failure message in order, still carrying color tags.
    pub failures: Vec<String>,
    pub duration: Duration,
    /// Files the loader found no tests in.
    pub skipped: Vec<PathBuf>,
    pub fmt_errors: FmtErrors,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.counters.failed == 0
    }

    /// The number of failed tests, saturated to fit a process exit code.
    pub fn exit_code(&self) -> u8 {
        u8::try_from(self.counters.failed).unwrap_or(u8::MAX)
    }
}
