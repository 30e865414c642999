//! Raw metadata rows as returned by dialect adapters.
//!
//! These are deliberately flat: one struct per row of the four metadata
//! queries. Normalization into the model happens in the assembler.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::Driver;
use crate::error::IntrospectResult;

/// A base table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub schema: String,
    pub name: String,
}

/// One column of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawColumn {
    pub schema: String,
    pub table: String,
    pub column: String,
    pub is_nullable: bool,
    #[serde(default)]
    pub default: Option<String>,
    pub native_type: String,
    #[serde(default)]
    pub max_length: Option<i32>,
    #[serde(default)]
    pub precision: Option<i32>,
    #[serde(default)]
    pub scale: Option<i32>,
    #[serde(default)]
    pub is_identity: bool,
    /// Member of a single-column unique constraint on its table.
    #[serde(default)]
    pub is_unique: bool,
}

/// One key column of one index. Rows arrive ordered by table, index and key
/// ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIndexColumn {
    pub schema: String,
    pub table: String,
    pub index_name: String,
    pub column_name: String,
    pub is_unique: bool,
    pub is_primary_key: bool,
}

/// One column pair of one foreign-key constraint. Rows arrive ordered by
/// owning table, constraint and ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawForeignKeyColumn {
    /// Identity of the constraint, unique across the database.
    pub constraint_id: String,
    /// 1-based position of this pair inside the constraint.
    pub ordinal: i32,
    pub owner_schema: String,
    pub owner_table: String,
    pub owner_column: String,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_column: String,
    /// Action token in underscore form (`NO_ACTION`, `SET_NULL`, `CASCADE`, ...).
    pub on_delete: String,
    pub on_update: String,
}

/// Everything the four metadata queries returned for one run.
///
/// Serializes to JSON so that a run can be replayed without a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMetadata {
    /// Dialect that produced the rows; selects the type map on replay.
    pub driver: Driver,
    pub tables: Vec<RawTable>,
    pub columns: Vec<RawColumn>,
    pub indexes: Vec<RawIndexColumn>,
    pub foreign_keys: Vec<RawForeignKeyColumn>,
}

impl RawMetadata {
    pub fn empty(driver: Driver) -> Self {
        Self {
            driver,
            tables: Vec::new(),
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> IntrospectResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> IntrospectResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> IntrospectResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> IntrospectResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
