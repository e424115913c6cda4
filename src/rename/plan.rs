//! Rename plans
//!
//! A [`RenamePlan`] pairs every selected file of a group with its new path.
//! Building a plan and simulating it never touch the filesystem beyond
//! reading metadata.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::discovery::MultifileGroup;
use crate::errors::{
    Error, Result, generic_error, partial_range_mismatch_error, simulation_failed_error,
};
use crate::naming::{token_ordinal, tokens_equivalent};
use crate::range::{LazyIndexableView, RangeDescriptor};
use crate::utils::normalize_path;

/// Where the new number goes in the file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenameMode {
    /// `base + pre_part + number + post_part + extension`
    #[default]
    InPlace,
    /// `base + post_part + pre_part + number + extension`
    ///
    /// The old post-part joins the base and the new number always follows
    /// the pre-part, so `show03 extra.mkv` with pre-part ` - ` becomes
    /// `show extra - 01.mkv`.
    Append,
}

/// Inclusive selection of a group's files by their current tokens, e.g. `2:3`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialRange {
    first: String,
    last: String,
}

impl PartialRange {
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        PartialRange {
            first: first.into(),
            last: last.into(),
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn last(&self) -> &str {
        &self.last
    }

    /// Positions of the first and last selected file within `tokens`
    fn locate(&self, tokens: &[String]) -> Result<(usize, usize)> {
        let find = |wanted: &str| tokens.iter().position(|t| tokens_equivalent(t, wanted));
        match (find(&self.first), find(&self.last)) {
            (Some(first), Some(last)) if first <= last => Ok((first, last)),
            _ => {
                let available = match (tokens.first(), tokens.last()) {
                    (Some(first), Some(last)) => format!("{first}..{last}"),
                    _ => String::from("(empty)"),
                };
                Err(partial_range_mismatch_error(&self.to_string(), &available))
            }
        }
    }
}

impl fmt::Display for PartialRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.first, self.last)
    }
}

impl FromStr for PartialRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().split_once(':') {
            Some((first, last))
                if !first.trim().is_empty() && !last.trim().is_empty() && !last.contains(':') =>
            {
                Ok(PartialRange::new(first.trim(), last.trim()))
            }
            _ => Err(generic_error(&format!(
                "Invalid partial range '{s}', expected FIRST:LAST"
            ))),
        }
    }
}

/// How the new names of a group are produced
#[derive(Debug, Clone)]
pub struct RenameOptions {
    naming: LazyIndexableView,
    pre_part: String,
    output_dir: Option<PathBuf>,
    partial: Option<PartialRange>,
    mode: RenameMode,
}

impl RenameOptions {
    /// Creates a new RenameOptionsBuilder numbering files from `naming`
    pub fn builder(naming: LazyIndexableView) -> RenameOptionsBuilder {
        RenameOptionsBuilder::new(naming)
    }

    pub fn naming(&self) -> &LazyIndexableView {
        &self.naming
    }

    pub fn pre_part(&self) -> &str {
        &self.pre_part
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn partial(&self) -> Option<&PartialRange> {
        self.partial.as_ref()
    }

    pub fn mode(&self) -> RenameMode {
        self.mode
    }
}

/// Builder for creating RenameOptions instances
///
/// Unset values default to an empty separator, renaming in place, the
/// group's own directory and the whole group.
#[derive(Debug, Clone)]
pub struct RenameOptionsBuilder {
    options: RenameOptions,
}

impl RenameOptionsBuilder {
    pub fn new(naming: LazyIndexableView) -> RenameOptionsBuilder {
        RenameOptionsBuilder {
            options: RenameOptions {
                naming,
                pre_part: String::new(),
                output_dir: None,
                partial: None,
                mode: RenameMode::default(),
            },
        }
    }

    /// Sets the text placed in front of the new number
    pub fn pre_part(mut self, pre_part: impl Into<String>) -> RenameOptionsBuilder {
        self.options.pre_part = pre_part.into();
        self
    }

    pub fn output_dir(mut self, output_dir: Option<PathBuf>) -> RenameOptionsBuilder {
        self.options.output_dir = output_dir;
        self
    }

    pub fn partial(mut self, partial: Option<PartialRange>) -> RenameOptionsBuilder {
        self.options.partial = partial;
        self
    }

    pub fn mode(mut self, mode: RenameMode) -> RenameOptionsBuilder {
        self.options.mode = mode;
        self
    }

    pub fn build(self) -> RenameOptions {
        self.options
    }
}

/// One planned move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEntry {
    pub source: PathBuf,
    pub target: PathBuf,
    /// Position of the file within its group
    pub position: i64,
    pub old_token: String,
    pub new_token: String,
}

impl RenameEntry {
    pub fn is_identity(&self) -> bool {
        normalize_path(&self.source) == normalize_path(&self.target)
    }
}

impl fmt::Display for RenameEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = |path: &Path| {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        write!(f, "{} -> {}", name(&self.source), name(&self.target))
    }
}

/// The moves that rename a group, and the group they produce
#[derive(Debug, Clone)]
pub struct RenamePlan {
    entries: Vec<RenameEntry>,
    result: MultifileGroup,
}

impl RenamePlan {
    /// The planned moves in group order, identity moves included
    pub fn entries(&self) -> &[RenameEntry] {
        &self.entries
    }

    /// The group as it will look after the plan has run
    pub fn result(&self) -> &MultifileGroup {
        &self.result
    }

    pub fn into_result(self) -> MultifileGroup {
        self.result
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks the plan against the filesystem without changing it.
    ///
    /// Returns the entries that actually move, in the order they must be
    /// executed. Identity entries are dropped. When new names reuse old
    /// ones, the order is reversed if the first file's number grows, and
    /// kept otherwise; each step is then replayed against a virtual view of
    /// the directory so that no move would land on a file not yet vacated.
    ///
    /// # Errors
    /// * `SimulationFailed` naming the offending path, with nothing touched
    pub fn simulate(&self) -> Result<Vec<RenameEntry>> {
        let mut ordered: Vec<RenameEntry> = self
            .entries
            .iter()
            .filter(|entry| !entry.is_identity())
            .cloned()
            .collect();

        let mut sources = HashSet::new();
        let mut targets = HashSet::new();
        for entry in &ordered {
            if !sources.insert(normalize_path(&entry.source)) {
                return Err(simulation_failed_error(
                    entry.source.clone(),
                    "the file is planned to move twice",
                ));
            }
            if !targets.insert(normalize_path(&entry.target)) {
                return Err(simulation_failed_error(
                    entry.target.clone(),
                    "more than one file would receive this name",
                ));
            }
            if entry.source.symlink_metadata().is_err() {
                return Err(simulation_failed_error(
                    entry.source.clone(),
                    "the file does not exist",
                ));
            }
        }

        let overlapping = targets.intersection(&sources).next().is_some();
        if overlapping && ordered.first().is_some_and(numbering_increases) {
            debug!("New names overlap old ones and count upwards, moving from the last file");
            ordered.reverse();
        }

        let mut vacated = HashSet::new();
        for entry in &ordered {
            let target = normalize_path(&entry.target);
            let occupied = if sources.contains(&target) {
                !vacated.contains(&target)
            } else {
                entry.target.symlink_metadata().is_ok()
            };
            if occupied {
                return Err(simulation_failed_error(
                    entry.target.clone(),
                    "the target already exists",
                ));
            }
            vacated.insert(normalize_path(&entry.source));
        }

        Ok(ordered)
    }
}

fn numbering_increases(entry: &RenameEntry) -> bool {
    match (token_ordinal(&entry.old_token), token_ordinal(&entry.new_token)) {
        (Some(old), Some(new)) => new > old,
        _ => false,
    }
}

/// Builds the plan renaming `group` according to `options`.
///
/// New numbers are aligned with group positions: the file at position `i`
/// receives `naming[i]`, so a partial range keeps its place in the numbering.
///
/// # Errors
/// * `PartialRangeMismatch` if the partial range is not found in the group
/// * `IndexOutOfRange` if the naming sequence is shorter than the selection
pub fn build_plan(group: &MultifileGroup, options: &RenameOptions) -> Result<RenamePlan> {
    let tokens = group.tokens()?;
    if tokens.is_empty() {
        return Err(generic_error("Cannot plan a rename for an empty group"));
    }
    let (first, last) = match options.partial() {
        Some(partial) => partial.locate(&tokens)?,
        None => (0, tokens.len() - 1),
    };

    let directory = options
        .output_dir()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| group.directory().to_path_buf());
    let naming = options.naming();
    let (base, post_part) = match options.mode() {
        RenameMode::InPlace => (group.base().to_string(), group.post_part().to_string()),
        RenameMode::Append => (format!("{}{}", group.base(), group.post_part()), String::new()),
    };

    let mut entries = Vec::with_capacity(last - first + 1);
    for (position, old_token) in tokens.iter().enumerate().take(last + 1).skip(first) {
        let position = position as i64;
        let new_token = naming.index(position)?;
        let new_name = format!(
            "{base}{}{new_token}{post_part}{}",
            options.pre_part(),
            group.extension()
        );
        entries.push(RenameEntry {
            source: group.directory().join(group.file_name(old_token)),
            target: directory.join(new_name),
            position,
            old_token: old_token.clone(),
            new_token,
        });
    }

    let sequence = naming.slice(&RangeDescriptor::span(first as i64, last as i64 + 1))?;
    let result = MultifileGroup::new(
        directory,
        base,
        options.pre_part(),
        sequence,
        post_part,
        group.extension(),
    );
    Ok(RenamePlan { entries, result })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::NamingCatalog;

    fn clip_group(directory: &Path) -> MultifileGroup {
        MultifileGroup::new(
            directory,
            "clip",
            "-",
            LazyIndexableView::from_values(["1", "2", "3"]),
            "",
            ".mp4",
        )
    }

    fn two_digit() -> LazyIndexableView {
        NamingCatalog::standard().continue_from_example("01").unwrap()
    }

    #[test]
    fn test_in_place_plan() {
        let plan = build_plan(
            &clip_group(Path::new("/media")),
            &RenameOptions::builder(two_digit()).build(),
        )
        .unwrap();

        let names: Vec<String> = plan.entries().iter().map(|e| e.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "clip-1.mp4 -> clip01.mp4",
                "clip-2.mp4 -> clip02.mp4",
                "clip-3.mp4 -> clip03.mp4"
            ]
        );
        assert_eq!(plan.result().to_string(), "clip[01..03].mp4 (3 files)");
    }

    #[test]
    fn test_append_mode_moves_number_to_the_end() {
        let group = MultifileGroup::new(
            "/media",
            "show",
            " ep",
            LazyIndexableView::from_values(["1", "2"]),
            " final",
            ".mkv",
        );
        let options = RenameOptions::builder(two_digit())
            .pre_part(" - ")
            .mode(RenameMode::Append)
            .build();
        let plan = build_plan(&group, &options).unwrap();

        assert_eq!(
            plan.entries()[1].target,
            PathBuf::from("/media/show final - 02.mkv")
        );
        assert_eq!(plan.result().base(), "show final");
        assert_eq!(plan.result().post_part(), "");
    }

    #[test]
    fn test_partial_range_keeps_positions() {
        let options = RenameOptions::builder(two_digit())
            .partial(Some("2:3".parse().unwrap()))
            .output_dir(Some(PathBuf::from("/out")))
            .build();
        let plan = build_plan(&clip_group(Path::new("/media")), &options).unwrap();

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.entries()[0].old_token, "2");
        assert_eq!(plan.entries()[0].new_token, "02");
        assert_eq!(plan.entries()[1].target, PathBuf::from("/out/clip03.mp4"));
        assert_eq!(plan.result().tokens().unwrap(), vec!["02", "03"]);
    }

    #[test]
    fn test_partial_range_mismatch() {
        for requested in ["2:5", "3:2", "x:y"] {
            let options = RenameOptions::builder(two_digit())
                .partial(Some(requested.parse().unwrap()))
                .build();
            let err = build_plan(&clip_group(Path::new("/media")), &options).unwrap_err();
            assert!(
                matches!(err, Error::PartialRangeMismatch { ref available, .. } if available == "1..3"),
                "{requested}: {err}"
            );
        }
    }

    #[test]
    fn test_partial_range_parsing() {
        let partial: PartialRange = " 02 : 03 ".parse().unwrap();
        assert_eq!(partial.first(), "02");
        assert_eq!(partial.last(), "03");
        assert!("2".parse::<PartialRange>().is_err());
        assert!(":3".parse::<PartialRange>().is_err());
        assert!("1:2:3".parse::<PartialRange>().is_err());
    }

    #[test]
    fn test_naming_too_short_for_group() {
        let naming = LazyIndexableView::from_values(["a", "b"]);
        let result = build_plan(
            &clip_group(Path::new("/media")),
            &RenameOptions::builder(naming).build(),
        );
        assert!(matches!(result, Err(Error::IndexOutOfRange { .. })));
    }
}
