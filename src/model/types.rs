//! Canonical column types.
//!
//! Every dialect maps its native type names onto this small set of semantic
//! types. The rendering stage only ever sees canonical types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dialect-independent semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalType {
    /// Character data, identifiers, and anything without a closer fit.
    String,
    /// Integral and fractional numbers.
    Number,
    /// Single-bit truth values.
    Boolean,
    /// Dates, times and timestamps.
    Date,
    /// Raw byte sequences.
    Binary,
    /// No canonical type. Only synthetic relation columns carry this.
    Unknown,
}

impl CanonicalType {
    /// Name used in outlines and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalType::String => "string",
            CanonicalType::Number => "number",
            CanonicalType::Boolean => "boolean",
            CanonicalType::Date => "Date",
            CanonicalType::Binary => "binary",
            CanonicalType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
