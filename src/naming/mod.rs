//! Naming conventions module
//!
//! This module contains the numbering conventions and the catalog that orders them.

mod catalog;
mod convention;

pub use catalog::{ALPHA_WIDTHS, MAX_DECIMAL_WIDTH, NamingCatalog, NamingSequence};
pub use convention::{ConventionKind, token_ordinal, tokens_equivalent};
