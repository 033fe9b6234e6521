//! Turning test files into definitions.
//!
//! Rust cannot load code from a file at run time, so the mapping from a file to
//! its [`Definition`] is up to the embedding binary. Any function with the right
//! signature is a [`Loader`]. [`Registry`] covers the common case of a fixed set
//! of suites registered up front, for example collected with `linkme`.

use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::definition::Definition;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    /// The file exists but declares no suite. The harness skips it with a warning.
    #[error("no tests found in {}", path.display())]
    NotFound { path: PathBuf },
}

pub trait Loader {
    fn load(&self, path: &Path) -> Result<Definition, LoadError>;
}

impl<F> Loader for F
where
    F: Fn(&Path) -> Result<Definition, LoadError>,
{
    fn load(&self, path: &Path) -> Result<Definition, LoadError> {
        self(path)
    }
}

type Constructor = Box<dyn Fn() -> Definition>;

/// A loader backed by suites registered per file.
///
/// A registered path matches every path that ends with it, so relative
/// registrations like `tests/math.rs` match the absolute paths produced by
/// discovery.
#[derive(Default)]
pub struct Registry {
    suites: BTreeMap<PathBuf, Constructor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_suite(
        mut self,
        path: impl Into<PathBuf>,
        constructor: impl Fn() -> Definition + 'static,
    ) -> Self {
        self.register(path, constructor);
        self
    }

    pub fn register(
        &mut self,
        path: impl Into<PathBuf>,
        constructor: impl Fn() -> Definition + 'static,
    ) {
        let path = path.into();
        if self.suites.insert(path.clone(), Box::new(constructor)).is_some() {
            tracing::warn!(path = %path.display(), "replacing registered suite");
        }
    }

    /// Registered paths in sorted order.
    pub fn paths(&self) -> impl ExactSizeIterator<Item = &Path> {
        self.suites.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.suites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }
}

impl Loader for Registry {
    fn load(&self, path: &Path) -> Result<Definition, LoadError> {
        let constructor = self
            .suites
            .get(path)
            .or_else(|| {
                self.suites
                    .iter()
                    .find(|(registered, _)| path.ends_with(registered))
                    .map(|(_, constructor)| constructor)
            })
            .ok_or_else(|| LoadError::NotFound {
                path: path.to_path_buf(),
            })?;

        let definition = constructor();
        Ok(match definition.path().as_os_str().is_empty() {
            true => definition.with_path(path),
            false => definition,
        })
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.suites.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{definition::leaf, steps};

    fn math() -> Definition {
        Definition::new("Math", "", |_| steps![leaf("adds", || ())])
    }

    #[test]
    fn registered_paths_match_by_suffix() {
        let registry = Registry::new().with_suite("tests/math.rs", math);

        let definition = registry.load(Path::new("/work/tests/math.rs")).unwrap();
        assert_eq!(definition.path(), Path::new("/work/tests/math.rs"));
        assert_eq!(definition.description(), "Math");
    }

    #[test]
    fn unknown_files_are_not_found() {
        let registry = Registry::new().with_suite("tests/math.rs", math);

        let err = registry.load(Path::new("/work/tests/other_math.rs")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { ref path } if path.ends_with("other_math.rs")));
    }

    #[test]
    fn closures_are_loaders() {
        let loader = |path: &Path| -> Result<Definition, LoadError> {
            Ok(Definition::new("from closure", path, |_| steps![]))
        };
        let definition = loader.load(Path::new("a.rs")).unwrap();
        assert_eq!(definition.path(), Path::new("a.rs"));
    }
}
