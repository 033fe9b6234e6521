//! The command line entry point.
//!
//! A test binary hands its [`Loader`] to [`main`] and returns the exit code:
//!
//! ```no_run
//! use std::process::ExitCode;
//!
//! use nestest::{Registry, cli};
//!
//! fn main() -> ExitCode {
//!     cli::main(Registry::new())
//! }
//! ```

use std::{
    error::Error as StdError,
    io,
    path::PathBuf,
    process::ExitCode,
    time::Duration,
};

use clap::{Parser, ValueEnum, builder::FalseyValueParser};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{DEFAULT_SPINNER_INTERVAL, HarnessConfig},
    formatter::color::ColorSetting,
    harness::Harness,
    loader::Loader,
};

pub const LOG_VAR: &str = "NESTEST_LOG";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl From<ColorChoice> for ColorSetting {
    fn from(value: ColorChoice) -> Self {
        match value {
            ColorChoice::Auto => ColorSetting::Automatic,
            ColorChoice::Always => ColorSetting::Always,
            ColorChoice::Never => ColorSetting::Never,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "nestest", version, about = "Run nested test suites")]
pub struct Args {
    /// Directory searched for test files.
    #[arg(default_value = "tests")]
    pub root: PathBuf,

    /// Only run test files whose path matches this regex, ignoring case.
    #[arg(short, long, env = "NESTEST_FILTER")]
    pub filter: Option<String>,

    /// Show output of tests instead of capturing it.
    #[arg(short, long, env = "NESTEST_OUTPUT", value_parser = FalseyValueParser::new())]
    pub output: bool,

    #[arg(long, value_enum, env = "NESTEST_COLOR", default_value_t)]
    pub color: ColorChoice,

    /// Never show a spinner while a test runs.
    #[arg(long)]
    pub no_spinner: bool,

    /// Milliseconds between spinner frames.
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_SPINNER_INTERVAL.as_millis() as u64)]
    pub spinner_interval: u64,

    /// Extension of test files.
    #[arg(long, default_value = "rs")]
    pub extension: String,

    /// Treat stack frames from paths containing this as library code. Repeatable.
    #[arg(long = "library-marker", value_name = "PATTERN")]
    pub library_markers: Vec<String>,
}

impl Args {
    pub fn config(&self) -> HarnessConfig {
        let spinner = (!self.no_spinner).then(|| Duration::from_millis(self.spinner_interval));
        HarnessConfig::new()
            .with_filter(self.filter.clone())
            .with_show_output(self.output)
            .with_color(self.color.into())
            .with_spinner(spinner)
            .with_extension(self.extension.clone())
            .with_library_markers(self.library_markers.clone())
    }
}

/// Log to stderr, filtered by `NESTEST_LOG` and only warnings by default.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .try_init();
}

/// Parse the command line, run every test file found and return the exit code.
pub fn main(loader: impl Loader) -> ExitCode {
    let args = Args::parse();
    init_tracing();
    run(&args, &loader)
}

pub fn run(args: &Args, loader: &impl Loader) -> ExitCode {
    let report = Harness::new(args.config()).and_then(|harness| harness.run_dir(loader, &args.root));
    match report {
        Ok(report) => ExitCode::from(report.exit_code()),
        Err(err) => {
            tracing::error!(error = %err, "run aborted");
            eprintln!("error: {}", error_chain(&err));
            ExitCode::FAILURE
        }
    }
}

fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    message
}
