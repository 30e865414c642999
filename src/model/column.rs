//! Entity columns.

use serde::{Deserialize, Serialize};

use super::relation::Relation;
use super::types::CanonicalType;

/// A column of an entity, physical or synthetic.
///
/// Synthetic ("virtual") columns do not exist in the database. They are
/// created on a referenced entity to carry the inverse side of a relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Unique within the owning entity.
    pub name: String,
    pub is_nullable: bool,
    /// Identity / auto-increment column.
    pub is_generated: bool,
    /// Participates in a single-column unique constraint.
    pub is_unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Type name as reported by the database. Empty for synthetic columns.
    pub native_type: String,
    pub canonical_type: CanonicalType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i32>,
    pub is_virtual: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<Relation>,
}

impl Column {
    /// Create a physical column with the given native and canonical types.
    pub fn new(
        name: impl Into<String>,
        native_type: impl Into<String>,
        canonical_type: CanonicalType,
    ) -> Self {
        Self {
            name: name.into(),
            is_nullable: false,
            is_generated: false,
            is_unique: false,
            default: None,
            native_type: native_type.into(),
            canonical_type,
            precision: None,
            scale: None,
            max_length: None,
            is_virtual: false,
            relations: Vec::new(),
        }
    }

    /// Create a synthetic column holding exactly one inverse relation.
    pub fn synthetic(name: impl Into<String>, relation: Relation) -> Self {
        Self {
            is_virtual: true,
            relations: vec![relation],
            ..Self::new(name, String::new(), CanonicalType::Unknown)
        }
    }

    /// Relations attached to this column, in emission order.
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Owner-side relations only.
    pub fn owned_relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.iter().filter(|r| r.is_owner)
    }
}
