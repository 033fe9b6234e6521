//! Semantic color tags.
//!
//! Everything the engine prints is written with tags like `<red>` or
//! `<darkGray>`. Right before writing, [`render`] replaces known tags with ANSI
//! escape codes, or removes them when color is off. Unknown tags are left as
//! they are, so text like `Vec<u8>` survives.

use std::{borrow::Cow, io, sync::LazyLock};

use regex::{Captures, Regex};

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum ColorSetting {
    #[default]
    Automatic,
    Always,
    Never,
}

impl ColorSetting {
    /// Whether output to `target` should be colored.
    pub fn use_color(&self, target: &impl SupportsColor) -> bool {
        match self {
            ColorSetting::Automatic => target.supports_color(),
            ColorSetting::Always => true,
            ColorSetting::Never => false,
        }
    }
}

pub(crate) mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BLACK: &str = "\x1b[90m";
    pub const RED: &str = "\x1b[91m";
    pub const GREEN: &str = "\x1b[92m";
    pub const YELLOW: &str = "\x1b[93m";
    pub const BLUE: &str = "\x1b[94m";
    pub const MAGENTA: &str = "\x1b[95m";
    pub const CYAN: &str = "\x1b[96m";
    pub const WHITE: &str = "\x1b[97m";
    pub const GRAY: &str = "\x1b[37m";
    pub const DARK_GRAY: &str = "\x1b[90m";
    pub const DARK_RED: &str = "\x1b[31m";
    pub const DARK_GREEN: &str = "\x1b[32m";
    pub const DARK_YELLOW: &str = "\x1b[33m";
    pub const DARK_BLUE: &str = "\x1b[34m";
    pub const DARK_MAGENTA: &str = "\x1b[35m";
    pub const DARK_CYAN: &str = "\x1b[36m";
}

pub trait SupportsColor {
    fn supports_color(&self) -> bool;
}

impl<T: io::IsTerminal> SupportsColor for T {
    fn supports_color(&self) -> bool {
        self.is_terminal()
    }
}

fn escape_code(tag: &str) -> Option<&'static str> {
    use colors::*;

    Some(match tag {
        "reset" => RESET,
        "black" => BLACK,
        "red" => RED,
        "green" => GREEN,
        "yellow" => YELLOW,
        "blue" => BLUE,
        "magenta" => MAGENTA,
        "cyan" => CYAN,
        "white" => WHITE,
        "gray" => GRAY,
        "darkGray" => DARK_GRAY,
        "darkRed" => DARK_RED,
        "darkGreen" => DARK_GREEN,
        "darkYellow" => DARK_YELLOW,
        "darkBlue" => DARK_BLUE,
        "darkMagenta" => DARK_MAGENTA,
        "darkCyan" => DARK_CYAN,
        _ => return None,
    })
}

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<(?P<tag>[a-zA-Z]+)>").unwrap());

/// Replace color tags with escape codes, or strip them if `use_color` is false.
pub fn render(text: &str, use_color: bool) -> Cow<'_, str> {
    TAG.replace_all(text, |caps: &Captures<'_>| {
        match (escape_code(&caps["tag"]), use_color) {
            (Some(code), true) => code.to_string(),
            (Some(_), false) => String::new(),
            (None, _) => caps[0].to_string(),
        }
    })
}
