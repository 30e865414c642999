//! Relation endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cardinality of one relation endpoint, seen from the column that carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    OneToOne,
    ManyToOne,
    OneToMany,
}

impl RelationKind {
    /// The kind carried by the opposite endpoint.
    pub fn inverse(self) -> Self {
        match self {
            RelationKind::OneToOne => RelationKind::OneToOne,
            RelationKind::ManyToOne => RelationKind::OneToMany,
            RelationKind::OneToMany => RelationKind::ManyToOne,
        }
    }

    /// Whether the far side of this endpoint is a collection.
    pub fn is_to_many(self) -> bool {
        matches!(self, RelationKind::OneToMany)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::OneToOne => write!(f, "OneToOne"),
            RelationKind::ManyToOne => write!(f, "ManyToOne"),
            RelationKind::OneToMany => write!(f, "OneToMany"),
        }
    }
}

/// Normalized ON DELETE / ON UPDATE action.
///
/// `NO_ACTION` has no representation: it normalizes to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferentialAction {
    Cascade,
    Restrict,
    SetNull,
    SetDefault,
    /// Any other token reported by the database, kept verbatim.
    Other(String),
}

impl ReferentialAction {
    /// Normalize an action token as reported by a dialect adapter.
    ///
    /// Adapters report the underscore form (`NO_ACTION`, `SET_NULL`, ...).
    /// Unrecognized tokens pass through unchanged.
    pub fn from_source(token: &str) -> Option<Self> {
        match token {
            "NO_ACTION" => None,
            "SET_NULL" => Some(ReferentialAction::SetNull),
            "CASCADE" => Some(ReferentialAction::Cascade),
            "RESTRICT" => Some(ReferentialAction::Restrict),
            "SET_DEFAULT" => Some(ReferentialAction::SetDefault),
            other => Some(ReferentialAction::Other(other.to_string())),
        }
    }

    /// SQL spelling of the action.
    pub fn as_sql(&self) -> &str {
        match self {
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET_DEFAULT",
            ReferentialAction::Other(token) => token,
        }
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// One directional half of a foreign-key relationship.
///
/// Every foreign-key column pair yields two of these: the owner side on the
/// real foreign-key column and the inverse side on a synthetic column of the
/// referenced entity. The two point at each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Table that carries this endpoint.
    pub owner_table: String,
    /// Column on `owner_table` this endpoint is about.
    pub owner_column: String,
    /// Schema of the table on the other end.
    pub related_schema: String,
    /// Table on the other end.
    pub related_table: String,
    /// Column on the other end.
    pub related_column: String,
    /// Synthetic column created on the referenced entity (owner side only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse_column: Option<String>,
    pub kind: RelationKind,
    /// True for the side holding the physical foreign key.
    pub is_owner: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ReferentialAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ReferentialAction>,
}

impl Relation {
    /// Whether `other` is the opposite endpoint of this relation.
    pub fn pairs_with(&self, other: &Relation) -> bool {
        self.is_owner != other.is_owner
            && self.related_table == other.owner_table
            && self.related_column.eq_ignore_ascii_case(&other.owner_column)
            && other.related_table == self.owner_table
            && other.related_column.eq_ignore_ascii_case(&self.owner_column)
            && self.kind.inverse() == other.kind
            && self.on_delete == other.on_delete
            && self.on_update == other.on_update
    }
}
