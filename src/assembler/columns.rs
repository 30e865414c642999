//! Column normalization.

use std::collections::HashMap;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::metadata::{RawColumn, TypeMapper};
use crate::model::{Column, Entity};

/// Attach raw column rows to their entities, in row order.
///
/// A column whose native type the mapper does not know is reported and
/// left out. Precision and scale are kept only for types that carry them;
/// length only for types that carry one, and only when positive.
///
/// Returns the number of columns added.
pub fn assemble_columns(
    entities: &mut [Entity],
    rows: &[RawColumn],
    mapper: &TypeMapper,
    sink: &mut dyn DiagnosticSink,
) -> usize {
    let slots: Vec<Option<usize>> = {
        let positions = entity_positions(entities);
        rows.iter()
            .map(|row| positions.get(&(row.schema.as_str(), row.table.as_str())).copied())
            .collect()
    };
    let mut added = 0;

    for (row, slot) in rows.iter().zip(slots) {
        let Some(slot) = slot else {
            tracing::debug!(table = %row.table, column = %row.column, "column of unknown table ignored");
            continue;
        };
        let Some(canonical) = mapper.canonical(&row.native_type) else {
            sink.report(Diagnostic::UnknownColumnType {
                native_type: row.native_type.clone(),
                table: row.table.clone(),
                column: row.column.clone(),
            });
            continue;
        };

        let mut column = Column::new(&row.column, &row.native_type, canonical);
        column.is_nullable = row.is_nullable;
        column.is_generated = row.is_identity;
        column.is_unique = row.is_unique;
        column.default = row.default.clone();
        if mapper.carries_precision(&row.native_type) {
            column.precision = row.precision;
            column.scale = row.scale;
        }
        if mapper.carries_length(&row.native_type) {
            column.max_length = row.max_length.filter(|len| *len > 0);
        }

        entities[slot].columns.push(column);
        added += 1;
    }
    added
}

/// `(schema, name)` to position in `entities`.
pub(crate) fn entity_positions(entities: &[Entity]) -> HashMap<(&str, &str), usize> {
    entities
        .iter()
        .enumerate()
        .map(|(i, e)| ((e.schema.as_str(), e.name.as_str()), i))
        .collect()
}
