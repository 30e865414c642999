//! Model assembly.
//!
//! A run has two halves. The fetch half issues the four metadata queries one
//! after another on a single adapter session and collects their rows into a
//! [`RawMetadata`]. The fold half is synchronous: it builds entities from the
//! table rows, then attaches columns, then indexes, then relations.
//!
//! ```text
//! adapter ──▶ tables ─▶ columns ─▶ indexes ─▶ foreign keys   (fetch_raw)
//!                                                   │
//!                                                   ▼
//!             entities ─▶ columns ─▶ indexes ─▶ relations     (assemble)
//! ```
//!
//! Relations come last because cardinality reads unique indexes and
//! synthetic names are checked against the columns already attached.

mod columns;
mod indexes;

use crate::config::ConnectionConfig;
use crate::diagnostics::DiagnosticSink;
use crate::error::IntrospectResult;
use crate::inference::{InferenceStats, NamingStrategy, RelationInferenceEngine};
use crate::metadata::{DialectAdapter, RawMetadata, SchemaFilter, TypeMapper};
use crate::model::{DatabaseModel, Entity};

pub use columns::assemble_columns;
pub use indexes::assemble_indexes;

/// Run the four metadata queries in order on an already connected adapter.
pub async fn fetch_raw(
    adapter: &mut dyn DialectAdapter,
    filter: &SchemaFilter,
) -> IntrospectResult<RawMetadata> {
    let tables = adapter.list_tables(filter).await?;
    tracing::debug!(count = tables.len(), "fetched tables");
    let columns = adapter.list_columns(filter).await?;
    tracing::debug!(count = columns.len(), "fetched columns");
    let indexes = adapter.list_indexes(filter).await?;
    tracing::debug!(count = indexes.len(), "fetched index columns");
    let foreign_keys = adapter.list_foreign_keys(filter).await?;
    tracing::debug!(count = foreign_keys.len(), "fetched foreign key columns");

    Ok(RawMetadata {
        driver: adapter.driver(),
        tables,
        columns,
        indexes,
        foreign_keys,
    })
}

/// Builds a [`DatabaseModel`] from an adapter or from raw rows.
#[derive(Debug, Clone, Default)]
pub struct ModelAssembler {
    engine: RelationInferenceEngine,
}

impl ModelAssembler {
    pub fn new(naming: NamingStrategy) -> Self {
        Self {
            engine: RelationInferenceEngine::new(naming),
        }
    }

    /// Connect, fetch, disconnect, then fold.
    ///
    /// Connect and query failures abort with no model. The adapter is
    /// disconnected even when a query fails.
    pub async fn introspect(
        &self,
        adapter: &mut dyn DialectAdapter,
        config: &ConnectionConfig,
        sink: &mut dyn DiagnosticSink,
    ) -> IntrospectResult<DatabaseModel> {
        let raw = self.fetch(adapter, config).await?;
        Ok(self.assemble(&raw, adapter.type_mapper(), sink))
    }

    /// Connect, run [`fetch_raw`], and disconnect.
    pub async fn fetch(
        &self,
        adapter: &mut dyn DialectAdapter,
        config: &ConnectionConfig,
    ) -> IntrospectResult<RawMetadata> {
        let filter = config.schema_filter()?;
        adapter.connect(config).await?;

        let fetched = fetch_raw(adapter, &filter).await;
        let closed = adapter.disconnect().await;
        let raw = fetched?;
        closed?;

        tracing::info!(driver = %adapter.driver().as_str(), "disconnected");
        Ok(raw)
    }

    /// Fold raw rows into a model. Never fails; problems go to `sink`.
    pub fn assemble(
        &self,
        raw: &RawMetadata,
        mapper: &TypeMapper,
        sink: &mut dyn DiagnosticSink,
    ) -> DatabaseModel {
        let mut entities: Vec<Entity> = raw
            .tables
            .iter()
            .map(|t| Entity::new(&t.schema, &t.name))
            .collect();

        let columns = assemble_columns(&mut entities, &raw.columns, mapper, sink);
        let indexes = assemble_indexes(&mut entities, &raw.indexes);
        let InferenceStats {
            relations,
            dropped_groups,
            dropped_pairs,
            ..
        } = self.engine.infer(&mut entities, &raw.foreign_keys, sink);

        tracing::info!(
            entities = entities.len(),
            columns,
            indexes,
            relations,
            dropped_groups,
            dropped_pairs,
            "model assembled"
        );
        DatabaseModel::new(entities)
    }
}

/// One-shot [`ModelAssembler::introspect`] with the given naming strategy.
pub async fn introspect(
    adapter: &mut dyn DialectAdapter,
    config: &ConnectionConfig,
    naming: NamingStrategy,
    sink: &mut dyn DiagnosticSink,
) -> IntrospectResult<DatabaseModel> {
    ModelAssembler::new(naming)
        .introspect(adapter, config, sink)
        .await
}
