//! Driving whole runs.
//!
//! A [`Harness`] owns everything that lives as long as a run: the formatter,
//! the failure log, the shared counters and the list of skipped files. Feed it
//! definitions, single files or a whole directory and [`finish`](Harness::finish)
//! it to print the conclusion and get the [`Report`].

use std::{
    env,
    io,
    path::{Path, PathBuf},
    time::Instant,
};

use crate::{
    Report,
    config::{HarnessConfig, RunSettings},
    definition::Definition,
    discovery,
    error::Result,
    filter::PathFilter,
    formatter::{
        Conclusion, ProgressFormatter, PushOnError, color::SupportsColor, named_fmt,
    },
    loader::{LoadError, Loader},
    node::{Counters, RunEnv, TestNode},
};

pub struct Harness<W = io::Stdout> {
    env: RunEnv<W>,
    filter: Option<PathFilter>,
    extension: String,
    counters: Counters,
    skipped: Vec<PathBuf>,
    started: Instant,
}

/// A harness printing to stdout, configured from the environment.
pub fn harness() -> Result<Harness> {
    Harness::new(HarnessConfig::from_env())
}

impl Harness<io::Stdout> {
    pub fn new(config: HarnessConfig) -> Result<Self> {
        Self::with_target(config, io::stdout())
    }
}

impl<W: io::Write + Send> Harness<W> {
    /// Set up a run writing to `target`.
    ///
    /// Fails if the filter is no valid regex. Color follows the configured
    /// setting, the spinner only runs if `target` is a terminal.
    pub fn with_target(config: HarnessConfig, target: W) -> Result<Self>
    where
        W: SupportsColor,
    {
        let filter = config.filter.as_deref().map(PathFilter::new).transpose()?;
        let working_dir = match config.working_dir {
            Some(working_dir) => working_dir,
            None => env::current_dir()?,
        };
        let use_color = config.color.use_color(&target);
        let interactive = target.supports_color();
        let formatter = ProgressFormatter::new(target)
            .with_color(use_color)
            .with_spinner(config.spinner.filter(|_| interactive));
        let settings = RunSettings {
            show_output: config.show_output,
            library: config.library,
            working_dir,
        };
        tracing::debug!(
            filter = config.filter.as_deref(),
            show_output = settings.show_output,
            color = formatter.use_color(),
            "harness ready"
        );

        Ok(Self {
            env: RunEnv::new(formatter, settings),
            filter,
            extension: config.extension.into_owned(),
            counters: Counters::default(),
            skipped: Vec::new(),
            started: Instant::now(),
        })
    }

    pub fn fmt_banner(&mut self) {
        self.env.fmt_errors.push_on_error(named_fmt!(
            self.env
                .formatter
                .fmt_banner(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
        ));
    }

    /// Run one root definition, returning the counts it added.
    pub fn run_definition(&mut self, definition: Definition) -> Counters {
        let before = self.counters;
        let mut node = TestNode::new(0, self.filter.clone());
        node.bind(definition);
        node.run(&mut self.counters, &mut self.env);
        Counters {
            passed: self.counters.passed - before.passed,
            failed: self.counters.failed - before.failed,
        }
    }

    /// Load `path` and run it. Files without tests are skipped with a warning.
    pub fn run_file(&mut self, loader: &impl Loader, path: &Path) -> Counters {
        match loader.load(path) {
            Ok(definition) => self.run_definition(definition),
            Err(LoadError::NotFound { path }) => {
                tracing::debug!(path = %path.display(), "no tests found");
                self.env
                    .fmt_errors
                    .push_on_error(named_fmt!(self.env.formatter.fmt_skipped(&path)));
                self.skipped.push(path);
                Counters::default()
            }
        }
    }

    pub fn run_files<P: AsRef<Path>>(
        mut self,
        loader: &impl Loader,
        paths: impl IntoIterator<Item = P>,
    ) -> Report {
        self.fmt_banner();
        for path in paths {
            self.run_file(loader, path.as_ref());
        }
        self.finish()
    }

    /// Discover every test file below `root` and run them in order.
    ///
    /// Discovery completes before the first test runs, so an unreadable
    /// directory fails the call without any test output.
    pub fn run_dir(self, loader: &impl Loader, root: impl AsRef<Path>) -> Result<Report> {
        let root = root.as_ref();
        let paths = discovery::find_tests(root, &self.extension).collect::<Result<Vec<_>>>()?;
        tracing::debug!(root = %root.display(), files = paths.len(), "discovered test files");
        Ok(self.run_files(loader, paths))
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Print the conclusion and hand out the report.
    pub fn finish(mut self) -> Report {
        let duration = self.started.elapsed();
        let failures = self.env.log.drain();
        self.env.fmt_errors.push_on_error(named_fmt!(
            self.env.formatter.fmt_conclusion(Conclusion {
                counters: self.counters,
                failures: &failures,
                duration,
            })
        ));

        Report {
            counters: self.counters,
            failures,
            duration,
            skipped: self.skipped,
            fmt_errors: self.env.fmt_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        definition::leaf,
        formatter::color::ColorSetting,
        loader::Registry,
        steps,
        test_support::{Buffer, screen},
    };

    fn harness(config: HarnessConfig) -> (Harness<Buffer>, Buffer) {
        let buffer = Buffer::default();
        let harness = Harness::with_target(config.with_working_dir("/work"), buffer.clone())
            .expect("valid config");
        (harness, buffer)
    }

    fn registry() -> Registry {
        Registry::new()
            .with_suite("tests/math.rs", || {
                Definition::new("Math", "", |_| {
                    steps![
                        leaf("adds", || crate::assert_eq!(1 + 1, 2)),
                        leaf("divides", || crate::assert_eq!(4 / 2, 3)),
                    ]
                })
            })
            .with_suite("tests/strings.rs", || {
                Definition::new("Strings", "", |_| steps![leaf("concats", || ())])
            })
    }

    #[test]
    fn invalid_filters_fail_early() {
        let buffer = Buffer::default();
        let result = Harness::with_target(
            HarnessConfig::new().with_filter(String::from("[")),
            buffer.clone(),
        );
        assert!(result.is_err());
        assert_eq!(buffer.contents(), "");
    }

    #[test]
    fn run_definition_returns_its_own_counts() {
        let (mut harness, _) = harness(HarnessConfig::new());
        let first = harness.run_definition(Definition::new("", "a.rs", |_| {
            steps![leaf("one", || ())]
        }));
        let second = harness.run_definition(Definition::new("", "b.rs", |_| {
            steps![leaf("two", || ()), leaf("three", || crate::assert!(false))]
        }));

        assert_eq!(first, Counters { passed: 1, failed: 0 });
        assert_eq!(second, Counters { passed: 1, failed: 1 });
        assert_eq!(harness.counters(), Counters { passed: 2, failed: 1 });
    }

    #[test]
    fn files_without_tests_are_skipped() {
        let (harness, buffer) = harness(HarnessConfig::new());
        let report = harness.run_files(&registry(), ["/work/tests/strings.rs", "/work/tests/empty.rs"]);

        assert_eq!(report.counters, Counters { passed: 1, failed: 0 });
        assert_eq!(report.skipped, [PathBuf::from("/work/tests/empty.rs")]);
        assert_eq!(report.exit_code(), 0);
        assert!(
            buffer
                .contents()
                .contains("No tests found in /work/tests/empty.rs, skipping...\n")
        );
    }

    #[test]
    fn filter_selects_files() {
        let (harness, _) = harness(HarnessConfig::new().with_filter(String::from("STRINGS")));
        let report = harness.run_files(&registry(), ["/work/tests/math.rs", "/work/tests/strings.rs"]);

        assert_eq!(report.counters, Counters { passed: 1, failed: 0 });
        assert!(report.failures.is_empty());
    }

    #[test]
    fn full_run_prints_conclusion() {
        let (harness, buffer) = harness(HarnessConfig::new().with_color(ColorSetting::Never));
        let report = harness.run_files(&registry(), ["/work/tests/math.rs", "/work/tests/strings.rs"]);

        assert_eq!(report.counters, Counters { passed: 2, failed: 1 });
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].contains("of <darkGray>/work/tests/math.rs"));

        let screen = screen(&buffer.contents());
        let banner = format!("\nnestest {}\n\n", env!("CARGO_PKG_VERSION"));
        assert!(screen.starts_with(&banner), "{screen}");
        assert!(screen.contains("Math\n✔ adds\n✘ divides\n  [!] `left == right` failed"));
        assert!(screen.contains("Strings\n✔ concats\n\n"));
        assert!(screen.contains("1 test failed!\n"));
        assert!(screen.contains("2 tests passed.\n"));
        assert!(screen.contains("\nTook "));
    }

    #[test]
    fn run_dir_discovers_files() {
        let root = env::temp_dir().join(format!("nestest-harness-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(root.join("tests")).unwrap();
        std::fs::write(root.join("tests/strings.rs"), "").unwrap();
        std::fs::write(root.join("tests/readme.md"), "").unwrap();

        let (harness, _) = harness(HarnessConfig::new().with_spinner(Some(Duration::from_millis(1))));
        let report = harness.run_dir(&registry(), root.join("tests")).unwrap();
        assert_eq!(report.counters, Counters { passed: 1, failed: 0 });

        std::fs::remove_dir_all(&root).unwrap();
    }
}
