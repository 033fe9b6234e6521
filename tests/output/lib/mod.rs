use std::{
    io,
    path::Path,
    string::FromUtf8Error,
    sync::{Arc, Mutex},
};

use nestest::{
    Harness, HarnessConfig, Loader, Report,
    formatter::color::{ColorSetting, SupportsColor},
};

mod sanitize;
pub use sanitize::*;

#[derive(Debug)]
#[allow(dead_code)]
pub enum Error {
    Poison,
    FromUtf8(FromUtf8Error),
}

#[derive(Debug, Default, Clone)]
pub struct Buffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::other("poison error"))?;
        io::Write::write(&mut *guard, buf)
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

impl Buffer {
    pub fn try_to_string(&self) -> Result<String, Error> {
        let guard = self.0.lock().map_err(|_| Error::Poison)?;
        String::from_utf8(guard.to_vec()).map_err(Error::FromUtf8)
    }
}

pub fn config() -> HarnessConfig {
    HarnessConfig::new()
        .with_color(ColorSetting::Never)
        .with_working_dir(env!("CARGO_MANIFEST_DIR"))
}

/// Run `paths` like the command line would and return the report and what was printed.
pub fn run<P: AsRef<Path>>(
    config: HarnessConfig,
    loader: &impl Loader,
    paths: impl IntoIterator<Item = P>,
) -> (Report, String) {
    let buffer = Buffer::default();
    let harness = Harness::with_target(config, buffer.clone()).unwrap();
    let report = harness.run_files(loader, paths);
    (report, buffer.try_to_string().unwrap())
}
