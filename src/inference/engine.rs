//! Relation inference over assembled entities.

use std::collections::HashMap;

use super::group::{ColumnPair, RelationGroup, RelationGroups};
use super::naming::{synthetic_column_name, NamingStrategy};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::metadata::RawForeignKeyColumn;
use crate::model::{Column, Entity, Relation, RelationKind};

/// Counters for one inference pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InferenceStats {
    /// Constraints seen.
    pub groups: usize,
    /// Owner/inverse pairs emitted.
    pub relations: usize,
    /// Constraints dropped for a missing entity.
    pub dropped_groups: usize,
    /// Column pairs dropped for a missing column.
    pub dropped_pairs: usize,
}

/// Turns foreign-key rows into owner/inverse relation pairs.
///
/// Must run after columns and indexes are attached to every entity: the
/// cardinality test reads the owner entity's unique indexes, and synthetic
/// names are chosen against the referenced entity's current columns.
#[derive(Debug, Clone, Default)]
pub struct RelationInferenceEngine {
    naming: NamingStrategy,
}

/// Resolved owner/referenced column names for one pair.
struct ResolvedPair {
    owner_column: String,
    referenced_column: String,
    kind: RelationKind,
}

impl RelationInferenceEngine {
    pub fn new(naming: NamingStrategy) -> Self {
        Self { naming }
    }

    pub fn naming(&self) -> NamingStrategy {
        self.naming
    }

    /// Attach relations for every foreign-key row to `entities`.
    ///
    /// Unresolvable references are reported to `sink` and skipped: the whole
    /// constraint when an entity is missing, one pair when a column is.
    pub fn infer(
        &self,
        entities: &mut [Entity],
        rows: &[RawForeignKeyColumn],
        sink: &mut dyn DiagnosticSink,
    ) -> InferenceStats {
        let positions: HashMap<(String, String), usize> = entities
            .iter()
            .enumerate()
            .map(|(i, e)| ((e.schema.clone(), e.name.clone()), i))
            .collect();

        let mut stats = InferenceStats::default();
        for group in RelationGroups::build(rows) {
            stats.groups += 1;

            let Some((owner_idx, referenced_idx)) = resolve_entities(&positions, &group, sink)
            else {
                stats.dropped_groups += 1;
                continue;
            };

            for pair in &group.pairs {
                let resolved =
                    match resolve_pair(entities, owner_idx, referenced_idx, &group, pair, sink) {
                        Some(resolved) => resolved,
                        None => {
                            stats.dropped_pairs += 1;
                            continue;
                        }
                    };
                self.emit(entities, owner_idx, referenced_idx, &group, resolved);
                stats.relations += 1;
            }
        }

        tracing::debug!(
            groups = stats.groups,
            relations = stats.relations,
            dropped_groups = stats.dropped_groups,
            dropped_pairs = stats.dropped_pairs,
            "relation inference finished"
        );
        stats
    }

    fn emit(
        &self,
        entities: &mut [Entity],
        owner_idx: usize,
        referenced_idx: usize,
        group: &RelationGroup,
        pair: ResolvedPair,
    ) {
        let inverse_kind = pair.kind.inverse();
        let (owner_schema, owner_name) = {
            let owner = &entities[owner_idx];
            (owner.schema.clone(), owner.name.clone())
        };
        let (referenced_schema, referenced_name, synthetic) = {
            let referenced = &entities[referenced_idx];
            let synthetic = synthetic_column_name(
                &owner_name,
                inverse_kind.is_to_many(),
                referenced,
                self.naming,
            );
            (referenced.schema.clone(), referenced.name.clone(), synthetic)
        };
        let referenced_column = pair.referenced_column.to_lowercase();

        let owner_side = Relation {
            owner_table: owner_name.clone(),
            owner_column: pair.owner_column.clone(),
            related_schema: referenced_schema,
            related_table: referenced_name.clone(),
            related_column: referenced_column.clone(),
            inverse_column: Some(synthetic.clone()),
            kind: pair.kind,
            is_owner: true,
            on_delete: group.on_delete.clone(),
            on_update: group.on_update.clone(),
        };
        let inverse_side = Relation {
            owner_table: referenced_name,
            owner_column: referenced_column,
            related_schema: owner_schema,
            related_table: owner_name,
            related_column: pair.owner_column.clone(),
            inverse_column: None,
            kind: inverse_kind,
            is_owner: false,
            on_delete: group.on_delete.clone(),
            on_update: group.on_update.clone(),
        };

        if let Some(column) = entities[owner_idx]
            .columns
            .iter_mut()
            .find(|c| !c.is_virtual && c.name == pair.owner_column)
        {
            column.relations.push(owner_side);
        }
        entities[referenced_idx]
            .columns
            .push(Column::synthetic(synthetic, inverse_side));
    }
}

fn resolve_entities(
    positions: &HashMap<(String, String), usize>,
    group: &RelationGroup,
    sink: &mut dyn DiagnosticSink,
) -> Option<(usize, usize)> {
    let lookup = |schema: &str, table: &str| positions.get(&(schema.to_string(), table.to_string())).copied();

    let Some(owner) = lookup(&group.owner_schema, &group.owner_table) else {
        sink.report(Diagnostic::EntityNotFound {
            owner_table: group.owner_table.clone(),
            referenced_table: group.referenced_table.clone(),
            missing: group.owner_table.clone(),
        });
        return None;
    };
    let Some(referenced) = lookup(&group.referenced_schema, &group.referenced_table) else {
        sink.report(Diagnostic::EntityNotFound {
            owner_table: group.owner_table.clone(),
            referenced_table: group.referenced_table.clone(),
            missing: group.referenced_table.clone(),
        });
        return None;
    };
    Some((owner, referenced))
}

fn resolve_pair(
    entities: &[Entity],
    owner_idx: usize,
    referenced_idx: usize,
    group: &RelationGroup,
    pair: &ColumnPair,
    sink: &mut dyn DiagnosticSink,
) -> Option<ResolvedPair> {
    let owner = &entities[owner_idx];
    let referenced = &entities[referenced_idx];

    let missing = |table: &str, column: &str| Diagnostic::ColumnNotFound {
        owner_table: group.owner_table.clone(),
        referenced_table: group.referenced_table.clone(),
        table: table.to_string(),
        column: column.to_string(),
    };

    let Some(owner_column) = owner.physical_column(&pair.owner) else {
        sink.report(missing(&owner.name, &pair.owner));
        return None;
    };
    let Some(referenced_column) = referenced.physical_column(&pair.referenced) else {
        sink.report(missing(&referenced.name, &pair.referenced));
        return None;
    };

    let kind = if owner.is_in_unique_index(&owner_column.name) {
        RelationKind::OneToOne
    } else {
        RelationKind::ManyToOne
    };

    Some(ResolvedPair {
        owner_column: owner_column.name.clone(),
        referenced_column: referenced_column.name.clone(),
        kind,
    })
}
