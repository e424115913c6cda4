//! Naming conventions
//!
//! Each convention renders a position as a numbering token and parses a token
//! back into its position.

use std::fmt;

use crate::range::EFFECTIVELY_UNBOUNDED;

const ALPHABET_LEN: i64 = 26;

/// One rendering of positions to numbering tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConventionKind {
    /// Zero-padded decimal with a fixed width: `007`
    PaddedDecimal { width: u32 },
    /// Plain decimal counting from `first`: `7`
    Decimal { first: i64 },
    /// Fixed-width base-26 with `a` as zero: `aa`, `ab`, ...
    PaddedAlpha { width: u32 },
    /// Bijective base-26: `a` .. `z`, `aa`, `ab`, ...
    Alpha,
}

impl ConventionKind {
    /// Number of positions this convention can render
    pub fn declared_length(&self) -> i64 {
        match self {
            ConventionKind::PaddedDecimal { width } => 10_i64.saturating_pow(*width),
            ConventionKind::PaddedAlpha { width } => ALPHABET_LEN.saturating_pow(*width),
            ConventionKind::Decimal { .. } | ConventionKind::Alpha => EFFECTIVELY_UNBOUNDED,
        }
    }

    /// Renders `position`, or `None` if the convention has no token for it
    pub fn render(&self, position: i64) -> Option<String> {
        if position < 0 {
            return None;
        }
        match *self {
            ConventionKind::PaddedDecimal { width } => {
                let token = format!("{position:0width$}", width = width as usize);
                (token.len() <= width as usize).then_some(token)
            }
            ConventionKind::Decimal { first } => position.checked_add(first).map(|v| v.to_string()),
            ConventionKind::PaddedAlpha { width } => {
                if position >= self.declared_length() {
                    return None;
                }
                let mut digits = Vec::with_capacity(width as usize);
                let mut rest = position;
                for _ in 0..width {
                    digits.push(alpha_digit(rest % ALPHABET_LEN));
                    rest /= ALPHABET_LEN;
                }
                Some(digits.iter().rev().collect())
            }
            ConventionKind::Alpha => {
                let mut digits = Vec::new();
                let mut rest = position + 1;
                while rest > 0 {
                    rest -= 1;
                    digits.push(alpha_digit(rest % ALPHABET_LEN));
                    rest /= ALPHABET_LEN;
                }
                Some(digits.iter().rev().collect())
            }
        }
    }

    /// Position whose rendering is `token`, if any
    pub fn parse(&self, token: &str) -> Option<i64> {
        if token.is_empty() || !token.chars().all(|c| self.is_token_char(c)) {
            return None;
        }
        let position = match *self {
            ConventionKind::PaddedDecimal { width } => {
                if token.len() != width as usize {
                    return None;
                }
                token.parse::<i64>().ok()?
            }
            ConventionKind::Decimal { first } => {
                if token.len() > 1 && token.starts_with('0') {
                    return None;
                }
                token.parse::<i64>().ok()?.checked_sub(first)?
            }
            ConventionKind::PaddedAlpha { width } => {
                if token.len() != width as usize {
                    return None;
                }
                token.bytes().try_fold(0_i64, |acc, b| {
                    acc.checked_mul(ALPHABET_LEN)?
                        .checked_add(i64::from(b - b'a'))
                })?
            }
            ConventionKind::Alpha => token
                .bytes()
                .try_fold(0_i64, |acc, b| {
                    acc.checked_mul(ALPHABET_LEN)?
                        .checked_add(i64::from(b - b'a') + 1)
                })?
                .checked_sub(1)?,
        };
        (position >= 0 && position < self.declared_length()).then_some(position)
    }

    /// Characters a token of this convention is made of
    pub fn is_token_char(&self, c: char) -> bool {
        match self {
            ConventionKind::PaddedDecimal { .. } | ConventionKind::Decimal { .. } => {
                c.is_ascii_digit()
            }
            ConventionKind::PaddedAlpha { .. } | ConventionKind::Alpha => c.is_ascii_lowercase(),
        }
    }
}

impl fmt::Display for ConventionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConventionKind::PaddedDecimal { width } => {
                write!(f, "zero-padded decimal, width {width}")
            }
            ConventionKind::Decimal { first } => write!(f, "decimal from {first}"),
            ConventionKind::PaddedAlpha { width } => write!(f, "padded alphabetic, width {width}"),
            ConventionKind::Alpha => write!(f, "alphabetic"),
        }
    }
}

fn alpha_digit(value: i64) -> char {
    char::from(b'a' + value as u8)
}

/// A comparable magnitude for a decimal or a lowercase alphabetic token.
///
/// Decimal tokens yield their value; alphabetic tokens yield their bijective
/// base-26 value, so `a` is 1 and `aa` is 27.
pub fn token_ordinal(token: &str) -> Option<i64> {
    if token.is_empty() {
        return None;
    }
    if token.chars().all(|c| c.is_ascii_digit()) {
        return token.parse().ok();
    }
    let lowered = token.to_ascii_lowercase();
    if lowered.chars().all(|c| c.is_ascii_lowercase()) {
        return ConventionKind::Alpha.parse(&lowered).map(|p| p + 1);
    }
    None
}

/// Whether two tokens name the same number: equal, or both decimal with the same value
pub fn tokens_equivalent(left: &str, right: &str) -> bool {
    if left == right {
        return true;
    }
    let decimal = |t: &str| !t.is_empty() && t.chars().all(|c| c.is_ascii_digit());
    decimal(left) && decimal(right) && token_ordinal(left) == token_ordinal(right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_decimal() {
        let kind = ConventionKind::PaddedDecimal { width: 3 };
        assert_eq!(kind.render(7).as_deref(), Some("007"));
        assert_eq!(kind.render(999).as_deref(), Some("999"));
        assert_eq!(kind.render(1000), None);
        assert_eq!(kind.parse("007"), Some(7));
        assert_eq!(kind.parse("07"), None);
        assert_eq!(kind.declared_length(), 1000);
    }

    #[test]
    fn test_one_based_decimal() {
        let kind = ConventionKind::Decimal { first: 1 };
        assert_eq!(kind.render(0).as_deref(), Some("1"));
        assert_eq!(kind.parse("12"), Some(11));
        assert_eq!(kind.parse("0"), None);
        assert_eq!(kind.parse("012"), None);
    }

    #[test]
    fn test_alphabetic() {
        let kind = ConventionKind::Alpha;
        assert_eq!(kind.render(0).as_deref(), Some("a"));
        assert_eq!(kind.render(25).as_deref(), Some("z"));
        assert_eq!(kind.render(26).as_deref(), Some("aa"));
        assert_eq!(kind.render(27).as_deref(), Some("ab"));
        for position in [0, 25, 26, 51, 52, 701, 702, 18277] {
            let token = kind.render(position).unwrap();
            assert_eq!(kind.parse(&token), Some(position), "token {token}");
        }
        assert_eq!(kind.parse("A"), None);
    }

    #[test]
    fn test_padded_alphabetic() {
        let kind = ConventionKind::PaddedAlpha { width: 2 };
        assert_eq!(kind.render(0).as_deref(), Some("aa"));
        assert_eq!(kind.render(27).as_deref(), Some("bb"));
        assert_eq!(kind.render(675).as_deref(), Some("zz"));
        assert_eq!(kind.render(676), None);
        assert_eq!(kind.parse("bb"), Some(27));
        assert_eq!(kind.parse("b"), None);
    }

    #[test]
    fn test_token_ordinal_and_equivalence() {
        assert_eq!(token_ordinal("007"), Some(7));
        assert_eq!(token_ordinal("c"), Some(3));
        assert_eq!(token_ordinal("aa"), Some(27));
        assert_eq!(token_ordinal("x1"), None);
        assert!(tokens_equivalent("02", "2"));
        assert!(!tokens_equivalent("b", "2"));
    }
}
