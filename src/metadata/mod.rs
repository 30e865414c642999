//! Raw metadata and the adapter contract.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        DialectAdapter                           │
//! │  list_tables()  list_columns()  list_indexes()  list_fk()       │
//! │          │              │              │            │           │
//! │       RawTable      RawColumn   RawIndexColumn  RawForeignKey   │
//! └─────────────────────────────────────────────────────────────────┘
//!     │                  │
//!     │  MssqlAdapter    │  PostgresAdapter / MySqlAdapter / SnapshotAdapter
//!     ▼                  ▼
//!  worker process     sqlx session / in-memory RawMetadata
//! ```
//!
//! Each adapter also owns a [`TypeMapper`] for its dialect.
//!
//! # Example
//!
//! ```ignore
//! use schemalens::metadata::{RawMetadata, SchemaFilter, SnapshotAdapter};
//!
//! let snapshot = RawMetadata::load("fixtures/library.json")?;
//! let mut adapter = SnapshotAdapter::connected(snapshot);
//! let tables = adapter.list_tables(&SchemaFilter::single("dbo")?).await?;
//! ```

mod provider;
mod raw;
mod snapshot;
mod type_map;

pub use provider::{checked_identifier, DatabaseFixtures, DialectAdapter, SchemaFilter};
pub use raw::{RawColumn, RawForeignKeyColumn, RawIndexColumn, RawMetadata, RawTable};
pub use snapshot::SnapshotAdapter;
pub use type_map::TypeMapper;
