//! Entity indexes.

use serde::{Deserialize, Serialize};

/// A column reference inside an index. Position in [`Index::columns`] is the
/// key ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexColumn {
    pub name: String,
}

/// An index of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Unique within the owning entity.
    pub name: String,
    pub is_unique: bool,
    pub is_primary_key: bool,
    /// Key columns in ordinal order.
    pub columns: Vec<IndexColumn>,
}

impl Index {
    pub fn new(name: impl Into<String>, is_unique: bool, is_primary_key: bool) -> Self {
        Self {
            name: name.into(),
            is_unique,
            is_primary_key,
            columns: Vec::new(),
        }
    }

    /// Append a key column after the existing ones.
    pub fn push_column(&mut self, name: impl Into<String>) {
        self.columns.push(IndexColumn { name: name.into() });
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Key column names in ordinal order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}
