use std::{
    io,
    mem,
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use crate::{
    Counters,
    formatter::{INDENT, backspace, color, indent, spinner},
};

pub const GLYPH_OK: char = '✔';
pub const GLYPH_ERROR: char = '✘';

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum ProgressState {
    #[default]
    Idle,
    Running {
        width: usize,
    },
}

/// Data for the end of run summary.
#[derive(Debug, Clone, Copy)]
pub struct Conclusion<'c> {
    pub counters: Counters,
    pub failures: &'c [String],
    pub duration: Duration,
}

/// Renders a run as it happens.
///
/// Each leaf goes through `idle -> running -> ok | error`. Entering `running`
/// prints the description and moves the cursor back to the start of the line,
/// so a spinner can rotate there while the leaf executes. Leaving it reprints
/// the line in place with a checkmark or a cross.
#[derive(Debug)]
pub struct ProgressFormatter<W> {
    target: Mutex<W>,
    use_color: bool,
    spinner: Option<Duration>,
    state: ProgressState,
}

impl Default for ProgressFormatter<io::Stdout> {
    fn default() -> Self {
        Self::new(io::stdout())
    }
}

impl<W> ProgressFormatter<W> {
    pub fn new(target: W) -> Self {
        Self {
            target: Mutex::new(target),
            use_color: false,
            spinner: None,
            state: ProgressState::Idle,
        }
    }

    pub fn with_target<WithTarget>(self, target: WithTarget) -> ProgressFormatter<WithTarget> {
        ProgressFormatter {
            target: Mutex::new(target),
            use_color: self.use_color,
            spinner: self.spinner,
            state: ProgressState::Idle,
        }
    }

    pub fn with_color(self, use_color: bool) -> Self {
        Self { use_color, ..self }
    }

    /// Paint a spinner every `interval` while a leaf runs, `None` disables it.
    pub fn with_spinner(self, interval: Option<Duration>) -> Self {
        Self {
            spinner: interval,
            ..self
        }
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    pub fn into_target(self) -> W {
        self.target
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: io::Write + Send> ProgressFormatter<W> {
    fn lock(&self) -> io::Result<MutexGuard<'_, W>> {
        self.target
            .lock()
            .map_err(|_| io::Error::other("poison error"))
    }

    fn write_tagged(&self, text: &str) -> io::Result<()> {
        let mut target = self.lock()?;
        target.write_all(color::render(text, self.use_color).as_bytes())?;
        target.flush()
    }

    /// Leave `running`, returning the sequence that moves back over the running line.
    fn leave_running(&mut self) -> String {
        match mem::take(&mut self.state) {
            ProgressState::Running { width } => backspace(width),
            ProgressState::Idle => String::new(),
        }
    }

    pub fn fmt_banner(&mut self, name: &str, version: &str) -> io::Result<()> {
        self.write_tagged(&format!("\n<magenta>{name} {version}<reset>\n\n"))
    }

    pub fn fmt_description(&mut self, level: usize, description: &str) -> io::Result<()> {
        if description.is_empty() {
            return Ok(());
        }
        self.write_tagged(&format!("{}<darkBlue>{description}<reset>\n", indent(level)))
    }

    pub fn fmt_leaf_start(&mut self, level: usize, description: &str) -> io::Result<()> {
        let line = format!("{}{INDENT}{description}", indent(level));
        let width = color::render(&line, false).chars().count();
        self.state = ProgressState::Running { width };
        self.write_tagged(&format!("{line}{}", backspace(width)))
    }

    /// Run `f`, with a spinner rotating at the start of the running line if enabled.
    pub fn spinning<R>(&self, f: impl FnOnce() -> R) -> R {
        match (self.spinner, self.state) {
            (Some(interval), ProgressState::Running { .. }) => {
                spinner::spin(&self.target, interval, f)
            }
            _ => f(),
        }
    }

    pub fn fmt_leaf_passed(
        &mut self,
        level: usize,
        description: &str,
        with_output: bool,
    ) -> io::Result<()> {
        let color = match with_output {
            true => "darkGreen",
            false => "green",
        };
        let back = self.leave_running();
        self.write_tagged(&format!(
            "{back}{}<{color}>{GLYPH_OK} {description}<reset>\n",
            indent(level)
        ))
    }

    /// Reprint the running line as failed and list every failure message below it.
    ///
    /// Captured `output` of the failed leaf follows the messages, dimmed.
    pub fn fmt_leaf_failed(
        &mut self,
        level: usize,
        description: &str,
        messages: &[String],
        output: &str,
    ) -> io::Result<()> {
        let back = self.leave_running();
        let prefix = indent(level);
        let mut text = format!("{back}{prefix}<red>{GLYPH_ERROR} {description}<reset>\n");
        for message in messages {
            text.push_str(&format!("{prefix}{INDENT}<darkRed>[!] {message}<reset>\n"));
        }
        for line in output.lines() {
            text.push_str(&format!("{prefix}{INDENT}{INDENT}<darkGray>{line}<reset>\n"));
        }
        self.write_tagged(&text)
    }

    /// A failure outside of any leaf, for example while a suite produced its steps.
    pub fn fmt_suite_failed(&mut self, level: usize, message: &str) -> io::Result<()> {
        self.write_tagged(&format!(
            "{}{INDENT}<darkRed>[!] {message}<reset>\n",
            indent(level)
        ))
    }

    pub fn fmt_suite_end(&mut self) -> io::Result<()> {
        self.write_tagged("\n")
    }

    pub fn fmt_skipped(&mut self, path: &Path) -> io::Result<()> {
        self.write_tagged(&format!(
            "<darkRed>No tests found in {}, skipping...<reset>\n",
            path.display()
        ))
    }

    pub fn fmt_conclusion(&mut self, conclusion: Conclusion<'_>) -> io::Result<()> {
        let Conclusion {
            counters: Counters { passed, failed },
            failures,
            duration,
        } = conclusion;
        let plural = |count: usize| if count == 1 { "" } else { "s" };

        let mut text = String::from("\n");
        if failed > 0 {
            for failure in failures {
                text.push_str(&format!("{failure}<reset>\n\n"));
            }
        }
        if passed > 0 {
            text.push_str(&format!(
                "<green>{passed} test{} passed.<reset>\n",
                plural(passed)
            ));
        }
        if failed > 0 {
            text.push_str(&format!(
                "<red>{failed} test{} failed!<reset>\n\n",
                plural(failed)
            ));
        }
        text.push_str(&format!(
            "\n\n<magenta>Took {:.2} seconds.<reset>\n\n",
            duration.as_secs_f64()
        ));
        self.write_tagged(&text)
    }
}
