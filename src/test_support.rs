use std::{
    io::{self, Write},
    sync::{Arc, LazyLock, Mutex},
};

use regex::Regex;

use crate::{
    config::RunSettings,
    formatter::{ProgressFormatter, color::SupportsColor},
    node::RunEnv,
};

/// A cloneable in-memory target, for handing to a harness and reading back later.
#[derive(Debug, Default, Clone)]
pub struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Buffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SupportsColor for Buffer {
    fn supports_color(&self) -> bool {
        false
    }
}

/// A run environment writing uncolored output without spinner into memory.
pub fn env() -> RunEnv<Vec<u8>> {
    RunEnv::new(ProgressFormatter::new(Vec::new()), RunSettings::default())
}

pub fn written(env: RunEnv<Vec<u8>>) -> String {
    String::from_utf8(env.formatter.into_target()).unwrap()
}

static OVERWRITTEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[^\n]*\x1b\[\d+D\x1b\[0m").unwrap());

/// What a terminal would show: lines rewritten in place only keep their final text.
pub fn screen(output: &str) -> String {
    OVERWRITTEN.replace_all(output, "").into_owned()
}

#[test]
fn screen_drops_running_lines() {
    assert_eq!(
        screen("  name\x1b[6D\x1b[0m\x1b[6D\x1b[0m✔ name\nplain\n"),
        "✔ name\nplain\n"
    );
}
