use std::{borrow::Cow, env, path::PathBuf, time::Duration};

use crate::{classify::LibraryFrames, formatter::color::ColorSetting};

pub const FILTER_VAR: &str = "NESTEST_FILTER";
pub const OUTPUT_VAR: &str = "NESTEST_OUTPUT";
pub const COLOR_VAR: &str = "NESTEST_COLOR";

pub const DEFAULT_SPINNER_INTERVAL: Duration = Duration::from_millis(100);

/// Everything that shapes a run, before it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Only test files whose path matches this regex run.
    pub filter: Option<String>,
    /// Let test output through instead of capturing it.
    pub show_output: bool,
    pub color: ColorSetting,
    /// `None` disables the spinner. It is also off whenever the target is no terminal.
    pub spinner: Option<Duration>,
    pub library: LibraryFrames,
    /// Attributed files are shown relative to this, the current directory if unset.
    pub working_dir: Option<PathBuf>,
    /// Extension of test files, without the dot.
    pub extension: Cow<'static, str>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            filter: None,
            show_output: false,
            color: ColorSetting::Automatic,
            spinner: Some(DEFAULT_SPINNER_INTERVAL),
            library: LibraryFrames::default(),
            working_dir: None,
            extension: Cow::Borrowed("rs"),
        }
    }
}

impl HarnessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, overridden by `NESTEST_FILTER`, `NESTEST_OUTPUT` and `NESTEST_COLOR`.
    pub fn from_env() -> Self {
        Self::default().with_vars(|key| env::var(key).ok())
    }

    pub(crate) fn with_vars(self, var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = self;
        if let Some(filter) = var(FILTER_VAR).filter(|filter| !filter.is_empty()) {
            config.filter = Some(filter);
        }
        if let Some(output) = var(OUTPUT_VAR) {
            config.show_output = parse_flag(&output);
        }
        if let Some(color) = var(COLOR_VAR) {
            match parse_color(&color) {
                Some(color) => config.color = color,
                None => tracing::warn!(value = %color, "ignoring unknown {COLOR_VAR}"),
            }
        }
        config
    }

    pub fn with_filter(self, filter: impl Into<Option<String>>) -> Self {
        Self {
            filter: filter.into(),
            ..self
        }
    }

    pub fn with_show_output(self, show_output: bool) -> Self {
        Self {
            show_output,
            ..self
        }
    }

    pub fn with_color(self, color: ColorSetting) -> Self {
        Self { color, ..self }
    }

    pub fn with_spinner(self, spinner: Option<Duration>) -> Self {
        Self { spinner, ..self }
    }

    pub fn with_library_markers<M: Into<Cow<'static, str>>>(
        self,
        markers: impl IntoIterator<Item = M>,
    ) -> Self {
        Self {
            library: self.library.extend_markers(markers),
            ..self
        }
    }

    pub fn with_working_dir(self, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: Some(working_dir.into()),
            ..self
        }
    }

    pub fn with_extension(self, extension: impl Into<Cow<'static, str>>) -> Self {
        Self {
            extension: extension.into(),
            ..self
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_color(value: &str) -> Option<ColorSetting> {
    match value.trim().to_ascii_lowercase().as_str() {
        "auto" | "automatic" => Some(ColorSetting::Automatic),
        "always" => Some(ColorSetting::Always),
        "never" => Some(ColorSetting::Never),
        _ => None,
    }
}

/// The part of the configuration every node needs while running.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub show_output: bool,
    pub library: LibraryFrames,
    pub working_dir: PathBuf,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            show_output: false,
            library: LibraryFrames::default(),
            working_dir: env::current_dir().unwrap_or_default(),
        }
    }
}
