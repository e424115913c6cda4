//! Multifile matching
//!
//! This module finds runs of consecutively numbered files in a flat file list.

use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::path::Path;

use log::{debug, trace};

use crate::errors::{Result, invalid_search_window_error};
use crate::naming::{ConventionKind, NamingCatalog, NamingSequence};
use crate::range::{LazyIndexableView, RangeDescriptor};

use super::affix::AffixGrammar;
use super::group::MultifileGroup;

/// Inclusive range of catalog positions a group may start at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    min: i64,
    max: i64,
}

impl SearchWindow {
    /// # Errors
    /// * `InvalidSearchWindow` if `min > max` or `min` is negative
    pub fn new(min: i64, max: i64) -> Result<Self> {
        if min > max || min < 0 {
            return Err(invalid_search_window_error(min, max));
        }
        Ok(SearchWindow { min, max })
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    fn positions(&self) -> RangeInclusive<i64> {
        self.min..=self.max
    }
}

impl Default for SearchWindow {
    fn default() -> Self {
        SearchWindow { min: 0, max: 1 }
    }
}

/// A run found during one discovery pass
#[derive(Debug, Clone)]
struct Run {
    sequence: LazyIndexableView,
    position: i64,
    length: i64,
    prefix: String,
    suffix: String,
    extension: String,
}

impl Run {
    fn file_names(&self) -> Vec<String> {
        (self.position..self.position + self.length)
            .filter_map(|p| self.sequence.index(p).ok())
            .map(|token| format!("{}{token}{}{}", self.prefix, self.suffix, self.extension))
            .collect()
    }

    fn into_group(self, directory: &Path, affixes: &AffixGrammar) -> Result<MultifileGroup> {
        let sequence = self.sequence.slice(&RangeDescriptor::span(
            self.position,
            self.position + self.length,
        ))?;
        let (base, pre_part) = affixes.split(&self.prefix);
        Ok(MultifileGroup::new(
            directory,
            base,
            pre_part,
            sequence,
            self.suffix,
            self.extension,
        ))
    }
}

/// Finds multifile groups in a directory listing
#[derive(Debug, Clone)]
pub struct MultifileMatcher<'a> {
    catalog: &'a NamingCatalog,
    window: SearchWindow,
    affixes: AffixGrammar,
}

impl<'a> MultifileMatcher<'a> {
    /// # Errors
    /// * `InvalidSearchWindow` if `min_in > max_in`
    pub fn new(catalog: &'a NamingCatalog, min_in: i64, max_in: i64) -> Result<Self> {
        Ok(MultifileMatcher::with_window(
            catalog,
            SearchWindow::new(min_in, max_in)?,
        ))
    }

    pub fn with_window(catalog: &'a NamingCatalog, window: SearchWindow) -> Self {
        MultifileMatcher {
            catalog,
            window,
            affixes: AffixGrammar::standard(),
        }
    }

    /// Replaces the affix grammar used to split pre-parts off group bases
    pub fn affixes(mut self, affixes: AffixGrammar) -> Self {
        self.affixes = affixes;
        self
    }

    pub fn window(&self) -> SearchWindow {
        self.window
    }

    /// Partitions `files` into groups, longest first.
    ///
    /// Each pass takes the longest run over all catalog entries and window
    /// positions, removes its files and searches the rest again, until no
    /// run of two or more files remains. Ties go to the run found first in
    /// catalog order, then position order.
    pub fn find_groups(&self, directory: &Path, files: &[String]) -> Result<Vec<MultifileGroup>> {
        let mut seen = HashSet::new();
        let mut remaining: Vec<String> = files
            .iter()
            .filter(|name| seen.insert(name.as_str()))
            .cloned()
            .collect();
        let mut groups = Vec::new();

        while let Some(run) = self.longest_run(&remaining) {
            let claimed: HashSet<String> = run.file_names().into_iter().collect();
            remaining.retain(|name| !claimed.contains(name));

            let group = run.into_group(directory, &self.affixes)?;
            debug!("Found group {group} in {}", directory.display());
            groups.push(group);
        }

        debug!(
            "Found {} groups in {}, {} files left ungrouped",
            groups.len(),
            directory.display(),
            remaining.len()
        );
        Ok(groups)
    }

    fn longest_run(&self, files: &[String]) -> Option<Run> {
        let present: HashSet<&str> = files.iter().map(String::as_str).collect();
        let mut best: Option<Run> = None;

        for entry in self.catalog.entries() {
            for position in self.window.positions() {
                if position >= entry.view().len() {
                    break;
                }
                let Ok(token) = entry.view().index(position) else {
                    continue;
                };

                for file in files {
                    for (stem, extension, offset) in candidate_splits(file, &token, entry.kind()) {
                        let prefix = &stem[..offset];
                        let suffix = &stem[offset + token.len()..];
                        let length = extend_run(entry, position, prefix, suffix, extension, &present);

                        if length > 1 && best.as_ref().is_none_or(|b| length > b.length) {
                            trace!(
                                "Run of {length} at position {position} of {} from {file}",
                                entry.kind()
                            );
                            best = Some(Run {
                                sequence: entry.view().clone(),
                                position,
                                length,
                                prefix: prefix.to_string(),
                                suffix: suffix.to_string(),
                                extension: extension.to_string(),
                            });
                        }
                    }
                }
            }
        }

        best
    }
}

/// Counts how many consecutive names, starting at `position`, exist in `present`
fn extend_run(
    entry: &NamingSequence,
    position: i64,
    prefix: &str,
    suffix: &str,
    extension: &str,
    present: &HashSet<&str>,
) -> i64 {
    let mut length = 1;
    while let Ok(token) = entry.view().index(position + length) {
        let candidate = format!("{prefix}{token}{suffix}{extension}");
        if !present.contains(candidate.as_str()) {
            break;
        }
        length += 1;
    }
    length
}

/// Splits a file name at its last dot; a leading dot does not start an extension
pub(crate) fn split_extension(file: &str) -> (&str, &str) {
    match file.rfind('.') {
        Some(index) if index > 0 => file.split_at(index),
        _ => (file, ""),
    }
}

/// Every `(stem, extension, offset)` under which `token` numbers `file`.
///
/// Occurrences in the stem come first. A token reaching into the extension,
/// as in `backup.7z.001` or `movie.part1`, is read against the whole name
/// with an empty extension.
fn candidate_splits<'f>(
    file: &'f str,
    token: &str,
    kind: ConventionKind,
) -> Vec<(&'f str, &'f str, usize)> {
    let (stem, extension) = split_extension(file);
    let mut splits: Vec<(&str, &str, usize)> = token_occurrences(stem, token, kind)
        .map(|offset| (stem, extension, offset))
        .collect();
    if !extension.is_empty() {
        splits.extend(
            token_occurrences(file, token, kind)
                .filter(|offset| offset + token.len() > stem.len())
                .map(|offset| (file, "", offset)),
        );
    }
    splits
}

/// Byte offsets where `token` occurs in `stem` as a whole token, i.e. not
/// directly next to another character of the convention's class
fn token_occurrences<'s>(
    stem: &'s str,
    token: &'s str,
    kind: ConventionKind,
) -> impl Iterator<Item = usize> + 's {
    stem.match_indices(token).filter_map(move |(offset, _)| {
        let before = stem[..offset].chars().next_back();
        let after = stem[offset + token.len()..].chars().next();
        let isolated = !before.is_some_and(|c| kind.is_token_char(c))
            && !after.is_some_and(|c| kind.is_token_char(c));
        isolated.then_some(offset)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("clip-1.mp4"), ("clip-1", ".mp4"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
        assert_eq!(split_extension("README"), ("README", ""));
    }

    #[test]
    fn test_token_occurrences_respect_class() {
        let decimal = ConventionKind::Decimal { first: 0 };
        let found: Vec<usize> = token_occurrences("base1-1", "1", decimal).collect();
        assert_eq!(found, vec![4, 6]);
        let found: Vec<usize> = token_occurrences("clip-11", "1", decimal).collect();
        assert!(found.is_empty());

        let found: Vec<usize> = token_occurrences("base-a", "a", ConventionKind::Alpha).collect();
        assert_eq!(found, vec![5]);
    }

    #[test]
    fn test_candidate_splits_reach_into_the_extension() {
        let padded = ConventionKind::PaddedDecimal { width: 3 };
        assert_eq!(
            candidate_splits("backup.7z.001", "001", padded),
            vec![("backup.7z.001", "", 10)]
        );
        assert_eq!(
            candidate_splits("scan_001.png", "001", padded),
            vec![("scan_001", ".png", 5)]
        );
    }

    #[test]
    fn test_rejects_inverted_window() {
        let catalog = NamingCatalog::standard();
        assert!(matches!(
            MultifileMatcher::new(&catalog, 3, 1),
            Err(crate::errors::Error::InvalidSearchWindow { min: 3, max: 1 })
        ));
    }

    #[test]
    fn test_finds_simple_group() {
        let catalog = NamingCatalog::standard();
        let matcher = MultifileMatcher::new(&catalog, 0, 1).unwrap();
        let files = names(&["clip-1.mp4", "clip-2.mp4", "clip-3.mp4"]);

        let groups = matcher.find_groups(Path::new("D"), &files).unwrap();
        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.base(), "clip");
        assert_eq!(group.pre_part(), "-");
        assert_eq!(group.post_part(), "");
        assert_eq!(group.extension(), ".mp4");
        assert_eq!(group.tokens().unwrap(), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_gap_ends_run() {
        let catalog = NamingCatalog::standard();
        let matcher = MultifileMatcher::new(&catalog, 0, 1).unwrap();
        let files = names(&["a1.txt", "a2.txt", "a4.txt", "a5.txt"]);

        let groups = matcher.find_groups(Path::new("."), &files).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].tokens().unwrap(), vec!["1", "2"]);
    }

    #[test]
    fn test_longer_bare_run_beats_short_padded_run() {
        let catalog = NamingCatalog::standard();
        let matcher = MultifileMatcher::new(&catalog, 0, 1).unwrap();
        let files: Vec<String> = (1..=12).map(|i| format!("page {i}.png")).collect();

        let groups = matcher.find_groups(Path::new("."), &files).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 12);
        assert_eq!(groups[0].pre_part(), " ");
    }

    #[test]
    fn test_padded_tokens_keep_their_width() {
        let catalog = NamingCatalog::standard();
        let matcher = MultifileMatcher::new(&catalog, 0, 1).unwrap();
        let files = names(&["track_001.flac", "track_002.flac", "track_003.flac"]);

        let groups = matcher.find_groups(Path::new("."), &files).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].tokens().unwrap(), vec!["001", "002", "003"]);
        assert_eq!(groups[0].base(), "track");
        assert_eq!(groups[0].pre_part(), "_");
    }
}
