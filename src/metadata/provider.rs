//! The dialect adapter contract.
//!
//! A [`DialectAdapter`] owns one database session and answers the four
//! metadata queries. Nothing else is required of a driver: any engine that
//! implements this trait plugs into the assembler unchanged.

use async_trait::async_trait;

use super::raw::{RawColumn, RawForeignKeyColumn, RawIndexColumn, RawTable};
use super::type_map::TypeMapper;
use crate::config::{ConnectionConfig, ConnectionError, Driver};
use crate::error::{IntrospectError, IntrospectResult};

/// Non-empty set of schema names introspection is restricted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaFilter {
    schemas: Vec<String>,
}

impl SchemaFilter {
    /// Build a filter. Blank names are ignored; at least one must remain.
    pub fn new<I, S>(schemas: I) -> Result<Self, ConnectionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let schemas: Vec<String> = schemas
            .into_iter()
            .map(Into::into)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if schemas.is_empty() {
            return Err(ConnectionError::InvalidConfig(
                "at least one schema is required".to_string(),
            ));
        }
        Ok(Self { schemas })
    }

    /// Filter on a single schema.
    pub fn single(schema: impl Into<String>) -> Result<Self, ConnectionError> {
        Self::new([schema.into()])
    }

    pub fn schemas(&self) -> &[String] {
        &self.schemas
    }

    pub fn contains(&self, schema: &str) -> bool {
        self.schemas.iter().any(|s| s == schema)
    }

    /// Render as a SQL literal list, e.g. `'dbo','sales'`.
    ///
    /// Single quotes are doubled. Only for transports without parameter
    /// binding.
    pub fn to_sql_list(&self) -> String {
        self.schemas
            .iter()
            .map(|s| format!("'{}'", s.replace('\'', "''")))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// One supported database engine.
///
/// Implementations hold at most one open session. The four list calls are
/// issued sequentially by the assembler; adapters need not support
/// concurrent queries.
#[async_trait]
pub trait DialectAdapter: Send {
    /// Engine this adapter speaks to.
    fn driver(&self) -> Driver;

    /// Native type name to canonical type table of this dialect.
    fn type_mapper(&self) -> &TypeMapper;

    /// Open the session. Failure is fatal for the run.
    async fn connect(&mut self, config: &ConnectionConfig) -> IntrospectResult<()>;

    /// Close the session. Safe to call when not connected.
    async fn disconnect(&mut self) -> IntrospectResult<()>;

    /// Base tables (no views) in the filtered schemas.
    async fn list_tables(&mut self, filter: &SchemaFilter) -> IntrospectResult<Vec<RawTable>>;

    /// One row per column of every table in the filtered schemas.
    async fn list_columns(&mut self, filter: &SchemaFilter) -> IntrospectResult<Vec<RawColumn>>;

    /// Index key columns, ordered by table, index and key ordinal.
    async fn list_indexes(
        &mut self,
        filter: &SchemaFilter,
    ) -> IntrospectResult<Vec<RawIndexColumn>>;

    /// Foreign-key column pairs owned by tables in the filtered schemas,
    /// ordered by owning table, constraint and ordinal.
    async fn list_foreign_keys(
        &mut self,
        filter: &SchemaFilter,
    ) -> IntrospectResult<Vec<RawForeignKeyColumn>>;
}

/// Database lifecycle statements used to set up test fixtures.
///
/// Not part of the introspection contract.
#[async_trait]
pub trait DatabaseFixtures: DialectAdapter {
    async fn create_database(&mut self, name: &str) -> IntrospectResult<()>;

    /// Switch the session to another database.
    async fn use_database(&mut self, name: &str) -> IntrospectResult<()>;

    async fn drop_database(&mut self, name: &str) -> IntrospectResult<()>;

    async fn database_exists(&mut self, name: &str) -> IntrospectResult<bool>;
}

/// Reject anything but a plain identifier before it is spliced into DDL.
pub fn checked_identifier(name: &str) -> IntrospectResult<&str> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(name)
    } else {
        Err(IntrospectError::InvalidIdentifier(name.to_string()))
    }
}
