use std::fs::create_dir_all;
use std::path::{Component, Path, PathBuf};

use directories::ProjectDirs;

use crate::constants::{APPLICATION, ORGANIZATION, QUALIFIER};
use crate::errors::{Result, file_operation_error, generic_error};

/// Makes `path` absolute and removes `.` and `..` components lexically
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

pub(crate) fn find_project_folder() -> Result<ProjectDirs> {
    let folder = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .ok_or_else(|| generic_error("Failed to determine project directories"))?;

    if !folder.config_dir().exists() {
        create_dir_all(folder.config_dir()).map_err(|e| {
            file_operation_error(e, folder.config_dir().to_path_buf(), "create directory")
        })?;
    }
    Ok(folder)
}

#[cfg(unix)]
pub(crate) fn is_hidden_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

#[cfg(windows)]
pub(crate) fn is_hidden_file(path: &Path) -> bool {
    use std::os::windows::fs::MetadataExt;

    let dotted = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'));
    if dotted {
        return true;
    }
    if let Ok(metadata) = path.metadata() {
        metadata.file_attributes() & 0x2 != 0 // FILE_ATTRIBUTE_HIDDEN
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_removes_dot_components() {
        let normalized = normalize_path(Path::new("/media/./shows/../clips/a.mp4"));
        assert!(normalized.ends_with("media/clips/a.mp4"));
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_relative_path_is_absolute() {
        assert!(normalize_path(Path::new("clip-1.mp4")).is_absolute());
    }

    #[test]
    fn test_is_hidden_file() {
        assert!(is_hidden_file(Path::new("/tmp/.clip-1.mp4.lock")));
        assert!(!is_hidden_file(Path::new("/tmp/clip-1.mp4")));
    }
}
