//! # Schemalens
//!
//! Relational schema introspection across SQL dialects.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        DialectAdapter (SQL Server / PostgreSQL / MySQL)  │
//! │     list_tables  list_columns  list_indexes  list_fks    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [fetch_raw]
//! ┌─────────────────────────────────────────────────────────┐
//! │                RawMetadata (flat rows, JSON)             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [assembler: type map, index fold]
//! ┌─────────────────────────────────────────────────────────┐
//! │           Entities with columns and indexes              │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [inference]
//! ┌─────────────────────────────────────────────────────────┐
//! │   DatabaseModel: owner + inverse relations per FK pair   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Fatal problems (cannot connect, a query failed) are [`IntrospectError`]s.
//! Everything else is a [`Diagnostic`] reported to the caller's sink while
//! the run continues.

pub mod assembler;
pub mod config;
pub mod diagnostics;
pub mod dialect;
pub mod error;
pub mod inference;
pub mod metadata;
pub mod model;
pub mod worker;

pub use diagnostics::{Diagnostic, DiagnosticSink, Diagnostics, SkipSummary};
pub use error::{IntrospectError, IntrospectResult};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::assembler::{fetch_raw, introspect, ModelAssembler};
    pub use crate::config::{ConnectionConfig, Driver, Settings};
    pub use crate::diagnostics::{Diagnostic, DiagnosticSink, Diagnostics, SkipSummary};
    pub use crate::dialect::{adapter_for, type_mapper_for};
    pub use crate::error::{IntrospectError, IntrospectResult};
    pub use crate::inference::NamingStrategy;
    pub use crate::metadata::{
        DatabaseFixtures, DialectAdapter, RawMetadata, SchemaFilter, SnapshotAdapter,
    };
    pub use crate::model::{
        CanonicalType, Column, DatabaseModel, Entity, Index, Relation, RelationKind,
    };
}
