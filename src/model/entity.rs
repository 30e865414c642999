//! Entities (tables).

use serde::{Deserialize, Serialize};

use super::column::Column;
use super::index::Index;

/// One table of the inspected database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub schema: String,
    /// Columns in database order, followed by synthetic columns in the order
    /// they were created.
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
}

impl Entity {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: schema.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Like [`column`](Self::column) but never returns a synthetic column.
    pub fn physical_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| !c.is_virtual && c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }

    pub fn index_mut(&mut self, name: &str) -> Option<&mut Index> {
        self.indexes.iter_mut().find(|i| i.name == name)
    }

    /// Whether `column` is a member of any unique index of this entity.
    ///
    /// Membership in a wider composite unique index counts as well.
    pub fn is_in_unique_index(&self, column: &str) -> bool {
        self.indexes
            .iter()
            .any(|i| i.is_unique && i.contains_column(column))
    }

    /// The primary key index, if the table has one.
    pub fn primary_key(&self) -> Option<&Index> {
        self.indexes.iter().find(|i| i.is_primary_key)
    }

    /// Physical columns only.
    pub fn physical_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.is_virtual)
    }

    /// Synthetic relation columns only.
    pub fn virtual_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_virtual)
    }

    /// Schema-qualified display name.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}
