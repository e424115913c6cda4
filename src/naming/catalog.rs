//! Naming sequence catalog
//!
//! The catalog is an ordered list of naming sequences, most specific format
//! first. Discovery walks it in order, so padded conventions win ties against
//! bare ones.

use crate::errors::{Result, no_matching_convention_error};
use crate::range::{LazyIndexableView, RangeDescriptor};

use super::convention::ConventionKind;

/// Widest zero-padded decimal convention in the standard catalog
pub const MAX_DECIMAL_WIDTH: u32 = 4;

/// Widths of the padded alphabetic conventions in the standard catalog
pub const ALPHA_WIDTHS: [u32; 2] = [2, 3];

/// A naming convention together with the view that renders it
#[derive(Debug, Clone)]
pub struct NamingSequence {
    kind: ConventionKind,
    view: LazyIndexableView,
}

impl NamingSequence {
    pub fn new(kind: ConventionKind) -> Self {
        let view = LazyIndexableView::from_generator(kind.declared_length(), move |position| {
            kind.render(position)
        });
        NamingSequence { kind, view }
    }

    pub fn kind(&self) -> ConventionKind {
        self.kind
    }

    pub fn view(&self) -> &LazyIndexableView {
        &self.view
    }

    /// Menu label with the first few tokens as a sample
    pub fn label(&self) -> String {
        let sample: Vec<String> = self.view.iter().take(3).filter_map(|t| t.ok()).collect();
        format!("{} ({}, ...)", self.kind, sample.join(", "))
    }
}

/// Immutable, ordered set of naming sequences
#[derive(Debug, Clone)]
pub struct NamingCatalog {
    entries: Vec<NamingSequence>,
}

impl NamingCatalog {
    /// Builds the standard catalog: padded decimal from the widest width down
    /// to 1, bare decimal from 0 and from 1, padded alphabetic at increasing
    /// widths, then bare alphabetic.
    pub fn standard() -> Self {
        let padded = (1..=MAX_DECIMAL_WIDTH)
            .rev()
            .map(|width| ConventionKind::PaddedDecimal { width });
        let decimal = [
            ConventionKind::Decimal { first: 0 },
            ConventionKind::Decimal { first: 1 },
        ];
        let alpha = ALPHA_WIDTHS
            .iter()
            .map(|&width| ConventionKind::PaddedAlpha { width });

        NamingCatalog::from_kinds(
            padded
                .chain(decimal)
                .chain(alpha)
                .chain([ConventionKind::Alpha]),
        )
    }

    pub fn from_kinds<I>(kinds: I) -> Self
    where
        I: IntoIterator<Item = ConventionKind>,
    {
        NamingCatalog {
            entries: kinds.into_iter().map(NamingSequence::new).collect(),
        }
    }

    pub fn entries(&self) -> &[NamingSequence] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NamingSequence> {
        self.entries.get(index)
    }

    /// Looks up an entry by its 1-based menu number
    pub fn choose(&self, choice: usize) -> Option<&NamingSequence> {
        choice.checked_sub(1).and_then(|index| self.entries.get(index))
    }

    /// Numbered menu lines, one per entry
    pub fn menu(&self) -> Vec<String> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| format!("{:>2}. {}", index + 1, entry.label()))
            .collect()
    }

    /// Finds the first entry that renders `token`, and the position it renders it at.
    ///
    /// # Errors
    /// * `NoMatchingConvention` if no entry renders the token at any position
    pub fn select_by_example(&self, token: &str) -> Result<(LazyIndexableView, i64)> {
        for entry in &self.entries {
            let Some(position) = entry.kind.parse(token) else {
                continue;
            };
            if entry.view.index(position).is_ok_and(|rendered| rendered == token) {
                return Ok((entry.view.clone(), position));
            }
        }
        Err(no_matching_convention_error(token))
    }

    /// The view continuing the style of `token`, starting at `token` itself
    pub fn continue_from_example(&self, token: &str) -> Result<LazyIndexableView> {
        let (view, position) = self.select_by_example(token)?;
        view.slice(&RangeDescriptor::from_start(position))
    }
}
