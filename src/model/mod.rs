//! Dialect-independent schema model.
//!
//! ```text
//! DatabaseModel
//!   └── Entity (schema, name)
//!         ├── Column ── Relation*   (physical or synthetic)
//!         └── Index ── IndexColumn* (ordinal order)
//! ```
//!
//! The model is built once per run by the [`assembler`](crate::assembler) and
//! handed to whatever renders it.

mod column;
mod database;
mod entity;
mod index;
mod relation;
mod types;

pub use column::Column;
pub use database::DatabaseModel;
pub use entity::Entity;
pub use index::{Index, IndexColumn};
pub use relation::{ReferentialAction, Relation, RelationKind};
pub use types::CanonicalType;
