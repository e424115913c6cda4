//! Separator and keyword affixes
//!
//! The text in front of a numbering token often ends in a separator and
//! a keyword (`show - ep 3`). The grammar `(separator?)(keyword?)(separator?)`
//! is matched against the tail of that text and split off as the pre-part.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{Result, pattern_matching_error};

/// Keywords recognised in front of a numbering token
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "episode", "ep", "part", "pt", "cd", "disc", "vol", "chapter", "ch",
];

static SEPARATOR_TAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\s._-]+$").expect("Failed to compile regex pattern for SEPARATOR_TAIL")
});

static STANDARD: Lazy<AffixGrammar> = Lazy::new(|| {
    AffixGrammar::new(DEFAULT_KEYWORDS).expect("Failed to compile the default keyword pattern")
});

/// Splits recognised affixes off the text preceding a numbering token
#[derive(Debug, Clone)]
pub struct AffixGrammar {
    keyword_tail: Option<Regex>,
}

impl AffixGrammar {
    /// Builds a grammar recognising `keywords`, matched case-insensitively.
    ///
    /// A keyword only counts when it starts the text or follows a separator,
    /// so `office` never loses its trailing `e` to a keyword.
    pub fn new<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return Ok(AffixGrammar { keyword_tail: None });
        }
        // Longest first, so `episode` is tried before `ep`
        keywords.sort_by_key(|k| std::cmp::Reverse(k.len()));

        let alternatives: Vec<String> = keywords.iter().map(|k| regex::escape(k)).collect();
        let pattern = format!(r"(?i)(?:^|[\s._-])({})$", alternatives.join("|"));
        let keyword_tail = Regex::new(&pattern).map_err(|e| pattern_matching_error(e, &pattern))?;

        Ok(AffixGrammar {
            keyword_tail: Some(keyword_tail),
        })
    }

    /// Grammar for [`DEFAULT_KEYWORDS`]
    pub fn standard() -> Self {
        STANDARD.clone()
    }

    /// Splits `prefix` into `(base, pre_part)` with `base + pre_part == prefix`
    pub fn split<'a>(&self, prefix: &'a str) -> (&'a str, &'a str) {
        let mut cut = strip_separator(prefix, prefix.len());

        if let Some(keyword) = self
            .keyword_tail
            .as_ref()
            .and_then(|re| re.captures(&prefix[..cut]))
            .and_then(|captures| captures.get(1))
        {
            cut = strip_separator(prefix, keyword.start());
        }

        prefix.split_at(cut)
    }
}

fn strip_separator(text: &str, end: usize) -> usize {
    SEPARATOR_TAIL
        .find(&text[..end])
        .map_or(end, |separator| separator.start())
}
