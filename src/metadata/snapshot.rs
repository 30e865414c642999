//! Adapter that replays a saved [`RawMetadata`] snapshot.

use async_trait::async_trait;

use super::provider::{DialectAdapter, SchemaFilter};
use super::raw::{RawColumn, RawForeignKeyColumn, RawIndexColumn, RawMetadata, RawTable};
use super::type_map::TypeMapper;
use crate::config::{ConnectionConfig, Driver};
use crate::dialect;
use crate::error::{IntrospectError, IntrospectResult};

/// Serves the four metadata queries from memory.
///
/// Rows are returned in snapshot order, restricted to the requested schemas
/// the same way a live adapter would restrict them.
pub struct SnapshotAdapter {
    snapshot: RawMetadata,
    connected: bool,
}

impl SnapshotAdapter {
    pub fn new(snapshot: RawMetadata) -> Self {
        Self {
            snapshot,
            connected: false,
        }
    }

    /// An adapter that is already "connected", for callers that skip `connect`.
    pub fn connected(snapshot: RawMetadata) -> Self {
        Self {
            snapshot,
            connected: true,
        }
    }

    pub fn snapshot(&self) -> &RawMetadata {
        &self.snapshot
    }

    fn ensure_connected(&self) -> IntrospectResult<()> {
        if self.connected {
            Ok(())
        } else {
            Err(IntrospectError::NotConnected)
        }
    }
}

#[async_trait]
impl DialectAdapter for SnapshotAdapter {
    fn driver(&self) -> Driver {
        self.snapshot.driver
    }

    fn type_mapper(&self) -> &TypeMapper {
        dialect::type_mapper_for(self.snapshot.driver)
    }

    async fn connect(&mut self, _config: &ConnectionConfig) -> IntrospectResult<()> {
        self.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> IntrospectResult<()> {
        self.connected = false;
        Ok(())
    }

    async fn list_tables(&mut self, filter: &SchemaFilter) -> IntrospectResult<Vec<RawTable>> {
        self.ensure_connected()?;
        Ok(self
            .snapshot
            .tables
            .iter()
            .filter(|t| filter.contains(&t.schema))
            .cloned()
            .collect())
    }

    async fn list_columns(&mut self, filter: &SchemaFilter) -> IntrospectResult<Vec<RawColumn>> {
        self.ensure_connected()?;
        Ok(self
            .snapshot
            .columns
            .iter()
            .filter(|c| filter.contains(&c.schema))
            .cloned()
            .collect())
    }

    async fn list_indexes(
        &mut self,
        filter: &SchemaFilter,
    ) -> IntrospectResult<Vec<RawIndexColumn>> {
        self.ensure_connected()?;
        Ok(self
            .snapshot
            .indexes
            .iter()
            .filter(|i| filter.contains(&i.schema))
            .cloned()
            .collect())
    }

    async fn list_foreign_keys(
        &mut self,
        filter: &SchemaFilter,
    ) -> IntrospectResult<Vec<RawForeignKeyColumn>> {
        self.ensure_connected()?;
        Ok(self
            .snapshot
            .foreign_keys
            .iter()
            .filter(|fk| filter.contains(&fk.owner_schema))
            .cloned()
            .collect())
    }
}
