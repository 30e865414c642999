//! Native type name to canonical type lookup.

use std::collections::{HashMap, HashSet};

use crate::model::CanonicalType;

/// Per-dialect type table.
///
/// Besides the canonical mapping it knows which native types carry a
/// numeric precision/scale and which carry a maximum length; only for those
/// are the corresponding raw values copied onto the column.
#[derive(Debug, Clone)]
pub struct TypeMapper {
    types: HashMap<&'static str, CanonicalType>,
    with_precision: HashSet<&'static str>,
    with_length: HashSet<&'static str>,
}

impl TypeMapper {
    pub fn new(
        types: &[(&'static str, CanonicalType)],
        with_precision: &[&'static str],
        with_length: &[&'static str],
    ) -> Self {
        Self {
            types: types.iter().copied().collect(),
            with_precision: with_precision.iter().copied().collect(),
            with_length: with_length.iter().copied().collect(),
        }
    }

    /// Canonical type for a native type name, `None` if unmapped.
    ///
    /// Lookup ignores ASCII case.
    pub fn canonical(&self, native: &str) -> Option<CanonicalType> {
        self.types.get(native.to_ascii_lowercase().as_str()).copied()
    }

    pub fn carries_precision(&self, native: &str) -> bool {
        self.with_precision
            .contains(native.to_ascii_lowercase().as_str())
    }

    pub fn carries_length(&self, native: &str) -> bool {
        self.with_length.contains(native.to_ascii_lowercase().as_str())
    }

    /// Number of mapped native types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
