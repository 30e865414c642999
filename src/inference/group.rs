//! Grouping of foreign-key rows into constraints.
//!
//! Adapters return one row per foreign-key column pair. A composite key
//! spans several rows; [`RelationGroups`] folds them back into one
//! [`RelationGroup`] per constraint. The groups only live for the duration
//! of one inference pass.

use std::collections::HashMap;

use crate::metadata::RawForeignKeyColumn;
use crate::model::ReferentialAction;

/// One owner column and the referenced column it points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPair {
    pub ordinal: i32,
    pub owner: String,
    pub referenced: String,
}

/// All column pairs of one foreign-key constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationGroup {
    pub constraint_id: String,
    pub owner_schema: String,
    pub owner_table: String,
    pub referenced_schema: String,
    pub referenced_table: String,
    /// Pairs in ordinal order.
    pub pairs: Vec<ColumnPair>,
    pub on_delete: Option<ReferentialAction>,
    pub on_update: Option<ReferentialAction>,
}

impl RelationGroup {
    fn start(row: &RawForeignKeyColumn) -> Self {
        Self {
            constraint_id: row.constraint_id.clone(),
            owner_schema: row.owner_schema.clone(),
            owner_table: row.owner_table.clone(),
            referenced_schema: row.referenced_schema.clone(),
            referenced_table: row.referenced_table.clone(),
            pairs: Vec::new(),
            on_delete: ReferentialAction::from_source(&row.on_delete),
            on_update: ReferentialAction::from_source(&row.on_update),
        }
    }

    /// Owner column names in ordinal order.
    pub fn owner_columns(&self) -> Vec<&str> {
        self.pairs.iter().map(|p| p.owner.as_str()).collect()
    }

    /// Referenced column names in ordinal order.
    pub fn referenced_columns(&self) -> Vec<&str> {
        self.pairs.iter().map(|p| p.referenced.as_str()).collect()
    }

    pub fn is_composite(&self) -> bool {
        self.pairs.len() > 1
    }
}

/// Groups keyed by constraint identity, in order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct RelationGroups {
    groups: Vec<RelationGroup>,
    by_constraint: HashMap<String, usize>,
}

impl RelationGroups {
    /// Fold foreign-key rows into groups.
    ///
    /// The first row of a constraint fixes its tables and actions. Pairs are
    /// ordered by ordinal; rows with equal ordinals keep arrival order.
    pub fn build(rows: &[RawForeignKeyColumn]) -> Self {
        let mut this = Self::default();
        for row in rows {
            let slot = match this.by_constraint.get(&row.constraint_id) {
                Some(&slot) => slot,
                None => {
                    this.groups.push(RelationGroup::start(row));
                    let slot = this.groups.len() - 1;
                    this.by_constraint.insert(row.constraint_id.clone(), slot);
                    slot
                }
            };
            this.groups[slot].pairs.push(ColumnPair {
                ordinal: row.ordinal,
                owner: row.owner_column.clone(),
                referenced: row.referenced_column.clone(),
            });
        }
        for group in &mut this.groups {
            group.pairs.sort_by_key(|p| p.ordinal);
        }
        this
    }

    pub fn get(&self, constraint_id: &str) -> Option<&RelationGroup> {
        self.by_constraint
            .get(constraint_id)
            .map(|&slot| &self.groups[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelationGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl IntoIterator for RelationGroups {
    type Item = RelationGroup;
    type IntoIter = std::vec::IntoIter<RelationGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}
