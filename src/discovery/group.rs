//! Multifile groups

use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::range::LazyIndexableView;

/// A run of files differing only in a consecutive numbering token.
///
/// File `i` of the group is
/// `directory/base + pre_part + sequence[i] + post_part + extension`.
#[derive(Debug, Clone)]
pub struct MultifileGroup {
    directory: PathBuf,
    base: String,
    pre_part: String,
    sequence: LazyIndexableView,
    post_part: String,
    extension: String,
}

impl MultifileGroup {
    pub fn new(
        directory: impl Into<PathBuf>,
        base: impl Into<String>,
        pre_part: impl Into<String>,
        sequence: LazyIndexableView,
        post_part: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        MultifileGroup {
            directory: directory.into(),
            base: base.into(),
            pre_part: pre_part.into(),
            sequence,
            post_part: post_part.into(),
            extension: extension.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn pre_part(&self) -> &str {
        &self.pre_part
    }

    pub fn sequence(&self) -> &LazyIndexableView {
        &self.sequence
    }

    pub fn post_part(&self) -> &str {
        &self.post_part
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Number of files in the group
    pub fn len(&self) -> usize {
        usize::try_from(self.sequence.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// File name carrying `token` as its number
    pub fn file_name(&self, token: &str) -> String {
        format!(
            "{}{}{}{}{}",
            self.base, self.pre_part, token, self.post_part, self.extension
        )
    }

    pub fn tokens(&self) -> Result<Vec<String>> {
        self.sequence.to_vec()
    }

    pub fn file_names(&self) -> Result<Vec<String>> {
        self.sequence
            .iter()
            .map(|token| token.map(|t| self.file_name(&t)))
            .collect()
    }

    pub fn files(&self) -> Result<Vec<PathBuf>> {
        Ok(self
            .file_names()?
            .into_iter()
            .map(|name| self.directory.join(name))
            .collect())
    }
}

impl fmt::Display for MultifileGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.sequence.index(0).unwrap_or_default();
        let last = self.sequence.index(-1).unwrap_or_default();
        write!(
            f,
            "{}{}[{first}..{last}]{}{} ({} files)",
            self.base,
            self.pre_part,
            self.post_part,
            self.extension,
            self.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names_follow_sequence() {
        let group = MultifileGroup::new(
            "/media",
            "show",
            " - ep",
            LazyIndexableView::from_values(["1", "2"]),
            " final",
            ".mkv",
        );
        assert_eq!(
            group.file_names().unwrap(),
            vec!["show - ep1 final.mkv", "show - ep2 final.mkv"]
        );
        assert_eq!(
            group.files().unwrap()[1],
            PathBuf::from("/media/show - ep2 final.mkv")
        );
        assert_eq!(group.to_string(), "show - ep[1..2] final.mkv (2 files)");
    }
}
