//! Directory scanning functionality
//!
//! This module produces the flat, filtered file lists the matcher works on.

use std::fs::read_dir;
use std::path::{Path, PathBuf};

use glob::Pattern;
use log::{debug, warn};
use walkdir::WalkDir;

use crate::errors::{
    Result, directory_not_found_error, file_operation_error, glob_pattern_error,
    invalid_filename_error,
};
use crate::utils::is_hidden_file;

/// Decides which directory entries take part in discovery
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pattern: Option<Pattern>,
    include_hidden: bool,
}

impl FileFilter {
    /// # Errors
    /// * `GlobPattern` if `glob` is not a valid pattern
    pub fn new(glob: Option<&str>, include_hidden: bool) -> Result<Self> {
        let pattern = glob
            .map(|g| Pattern::new(g).map_err(|e| glob_pattern_error(e, g)))
            .transpose()?;
        Ok(FileFilter {
            pattern,
            include_hidden,
        })
    }

    pub fn accepts(&self, path: &Path, file_name: &str) -> bool {
        if !self.include_hidden && is_hidden_file(path) {
            return false;
        }
        self.pattern
            .as_ref()
            .is_none_or(|pattern| pattern.matches(file_name))
    }
}

/// Lists the names of the regular files in `directory` that pass `filter`, sorted
///
/// # Errors
/// Returns an error if the directory does not exist or cannot be read
pub fn scan_directory(directory: &Path, filter: &FileFilter) -> Result<Vec<String>> {
    debug!("Scanning directory: {}", directory.display());

    if !directory.is_dir() {
        return Err(directory_not_found_error(directory.to_path_buf()));
    }

    let entries = read_dir(directory)
        .map_err(|e| file_operation_error(e, directory.to_path_buf(), "read directory"))?;

    let mut files: Vec<String> = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter_map(|path| match path.file_name()?.to_str() {
            Some(name) => filter.accepts(&path, name).then(|| name.to_string()),
            None => {
                warn!("Skipping {}", invalid_filename_error(path.clone()));
                None
            }
        })
        .collect();
    files.sort();

    debug!("Found {} files in directory", files.len());

    Ok(files)
}

/// Returns `root`, followed by all of its subdirectories when `recursive` is set
///
/// Hidden subdirectories are skipped. Symbolic links are not followed, so a
/// link back to an ancestor never lists the same directory twice.
pub fn collect_directories(root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(directory_not_found_error(root.to_path_buf()));
    }
    if !recursive {
        return Ok(vec![root.to_path_buf()]);
    }

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden_file(entry.path()));

    let mut directories = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            file_operation_error(e.into(), path, "read directory")
        })?;
        if entry.file_type().is_dir() {
            directories.push(entry.into_path());
        }
    }
    debug!("Collected {} directories under {}", directories.len(), root.display());

    Ok(directories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{File, create_dir_all};
    use tempfile::tempdir;

    #[test]
    fn test_scan_directory_filters_and_sorts() {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        for name in ["b-2.txt", "a-1.txt", ".a-1.txt.lock", "notes.md"] {
            File::create(temp_dir.path().join(name)).expect("Failed to create test file");
        }
        create_dir_all(temp_dir.path().join("sub")).expect("Failed to create subdirectory");

        let all = scan_directory(temp_dir.path(), &FileFilter::default()).unwrap();
        assert_eq!(all, vec!["a-1.txt", "b-2.txt", "notes.md"]);

        let filter = FileFilter::new(Some("*.txt"), false).unwrap();
        let txt = scan_directory(temp_dir.path(), &filter).unwrap();
        assert_eq!(txt, vec!["a-1.txt", "b-2.txt"]);
    }

    #[test]
    fn test_collect_directories_recursively() {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        create_dir_all(temp_dir.path().join("one/two")).expect("Failed to create directories");
        create_dir_all(temp_dir.path().join(".git")).expect("Failed to create directories");

        let flat = collect_directories(temp_dir.path(), false).unwrap();
        assert_eq!(flat.len(), 1);

        let nested = collect_directories(temp_dir.path(), true).unwrap();
        assert_eq!(
            nested,
            vec![
                temp_dir.path().to_path_buf(),
                temp_dir.path().join("one"),
                temp_dir.path().join("one/two"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_is_not_followed() {
        use std::os::unix::fs::symlink;

        let temp_dir = tempdir().expect("Failed to create temp directory");
        let sub = temp_dir.path().join("sub");
        create_dir_all(&sub).expect("Failed to create subdirectory");
        symlink(temp_dir.path(), sub.join("back")).expect("Failed to create symlink");
        symlink(&sub, temp_dir.path().join("again")).expect("Failed to create symlink");

        let nested = collect_directories(temp_dir.path(), true).unwrap();
        assert_eq!(nested, vec![temp_dir.path().to_path_buf(), sub]);
    }

    #[test]
    fn test_invalid_glob() {
        assert!(FileFilter::new(Some("["), false).is_err());
    }
}
