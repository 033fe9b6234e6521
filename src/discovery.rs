use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Every file below `root` whose name ends in `.{extension}`, depth first.
///
/// Entries of a directory are visited sorted by file name, so runs are
/// reproducible. Yielded paths are canonical.
pub fn find_tests<'r>(
    root: &'r Path,
    extension: &str,
) -> impl Iterator<Item = Result<PathBuf>> + 'r {
    let suffix = format!(".{extension}");
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(move |entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    return Some(Err(Error::Discovery {
                        root: root.to_path_buf(),
                        source,
                    }));
                }
            };
            let is_test = entry.file_type().is_file()
                && entry.file_name().to_string_lossy().ends_with(&suffix);
            is_test.then(|| entry.path().canonicalize().map_err(Error::from))
        })
}
