//! The root of an inspected schema.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::relation::Relation;

/// All entities of the inspected schema(s).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseModel {
    /// Entities in the order the adapter listed their tables.
    pub entities: Vec<Entity>,
}

impl DatabaseModel {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    /// Look up an entity by schema and table name.
    pub fn entity(&self, schema: &str, name: &str) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.schema == schema && e.name == name)
    }

    /// Look up an entity by table name alone, first match wins.
    pub fn entity_named(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Every relation endpoint in the model.
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.entities
            .iter()
            .flat_map(|e| e.columns.iter())
            .flat_map(|c| c.relations.iter())
    }

    pub fn column_count(&self) -> usize {
        self.entities.iter().map(|e| e.columns.len()).sum()
    }

    pub fn index_count(&self) -> usize {
        self.entities.iter().map(|e| e.indexes.len()).sum()
    }

    /// Number of owner-side relations, i.e. foreign-key column pairs resolved.
    pub fn owner_relation_count(&self) -> usize {
        self.relations().filter(|r| r.is_owner).count()
    }

    /// Plain-text rendering of the whole model.
    ///
    /// Stable for a given model; used by the CLI and in tests.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        for entity in &self.entities {
            let _ = writeln!(out, "{}", entity.qualified_name());
            for column in &entity.columns {
                if column.is_virtual {
                    let _ = writeln!(out, "  {}: virtual", column.name);
                } else {
                    let _ = write!(
                        out,
                        "  {}: {} ({})",
                        column.name, column.native_type, column.canonical_type
                    );
                    if let Some(len) = column.max_length {
                        let _ = write!(out, " len={}", len);
                    }
                    if let (Some(p), Some(s)) = (column.precision, column.scale) {
                        let _ = write!(out, " precision={},{}", p, s);
                    }
                    if column.is_nullable {
                        out.push_str(" nullable");
                    }
                    if column.is_generated {
                        out.push_str(" generated");
                    }
                    if column.is_unique {
                        out.push_str(" unique");
                    }
                    out.push('\n');
                }
                for relation in &column.relations {
                    let _ = write!(
                        out,
                        "    {} -> {}.{}",
                        relation.kind, relation.related_table, relation.related_column
                    );
                    if let Some(inverse) = &relation.inverse_column {
                        let _ = write!(out, " as {}", inverse);
                    }
                    if relation.is_owner {
                        out.push_str(" owner");
                    }
                    if let Some(action) = &relation.on_delete {
                        let _ = write!(out, " on delete {}", action);
                    }
                    if let Some(action) = &relation.on_update {
                        let _ = write!(out, " on update {}", action);
                    }
                    out.push('\n');
                }
            }
            for index in &entity.indexes {
                let _ = write!(out, "  index {}", index.name);
                if index.is_primary_key {
                    out.push_str(" primary");
                }
                if index.is_unique {
                    out.push_str(" unique");
                }
                let _ = writeln!(out, " ({})", index.column_names().join(", "));
            }
        }
        out
    }
}
