//! Names for synthetic inverse-side columns.
//!
//! The inverse side of a relation needs a column on the referenced entity.
//! Its name derives from the owner entity: lower-cased, plural when the
//! inverse side is a collection. A name already taken on the referenced
//! entity gets a numeric suffix, starting at 2.

use inflector::Inflector;
use serde::{Deserialize, Serialize};

use crate::model::Entity;

/// How the base name is pluralized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingStrategy {
    /// Append a bare `s`.
    #[default]
    Plain,
    /// English plural rules (`category` → `categories`).
    Inflected,
}

impl NamingStrategy {
    /// Base name before collision handling.
    pub fn base_name(&self, owner_entity: &str, to_many: bool) -> String {
        let lowered = owner_entity.to_lowercase();
        if !to_many {
            return lowered;
        }
        match self {
            NamingStrategy::Plain => lowered + "s",
            NamingStrategy::Inflected => lowered.to_plural(),
        }
    }
}

/// Pick a column name for the inverse side of a relation owned by
/// `owner_entity`, unique among `referenced`'s current columns.
///
/// Suffixes run from 2 up to `referenced.columns.len() + 1`. With `n`
/// existing columns at most `n` of the `n + 1` candidates can be taken, so
/// the search always ends on a free name.
pub fn synthetic_column_name(
    owner_entity: &str,
    to_many: bool,
    referenced: &Entity,
    strategy: NamingStrategy,
) -> String {
    let base = strategy.base_name(owner_entity, to_many);
    if !referenced.has_column(&base) {
        return base;
    }

    let bound = referenced.columns.len() + 1;
    (2..=bound)
        .map(|suffix| format!("{}{}", base, suffix))
        .find(|candidate| !referenced.has_column(candidate))
        .unwrap_or_else(|| format!("{}{}", base, bound))
}
