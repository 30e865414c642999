//! Relation inference.
//!
//! Foreign-key rows become paired relations on the entity model:
//!
//! ```text
//! RawForeignKeyColumn rows
//!          │
//!          ▼ [group]   one RelationGroup per constraint, pairs by ordinal
//! RelationGroups
//!          │
//!          ▼ [engine]  resolve entities/columns, decide cardinality
//! owner relation on the FK column
//!   + synthetic inverse column on the referenced entity [naming]
//! ```
//!
//! Cardinality comes from the owner entity's unique indexes, so inference
//! runs last, after columns and indexes are attached.

mod engine;
mod group;
mod naming;

pub use engine::{InferenceStats, RelationInferenceEngine};
pub use group::{ColumnPair, RelationGroup, RelationGroups};
pub use naming::{synthetic_column_name, NamingStrategy};
