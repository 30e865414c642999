//! Index assembly.

use crate::metadata::RawIndexColumn;
use crate::model::{Entity, Index};

use super::columns::entity_positions;

/// Fold index-column rows into [`Index`]es on their entities.
///
/// Rows of one index are merged by name. The first row of an index fixes
/// its unique and primary-key flags; later rows only append columns, so
/// key order is row order. Adapters return rows by key ordinal.
///
/// Returns the number of indexes created.
pub fn assemble_indexes(entities: &mut [Entity], rows: &[RawIndexColumn]) -> usize {
    let slots: Vec<Option<usize>> = {
        let positions = entity_positions(entities);
        rows.iter()
            .map(|row| positions.get(&(row.schema.as_str(), row.table.as_str())).copied())
            .collect()
    };
    let mut created = 0;

    for (row, slot) in rows.iter().zip(slots) {
        let Some(slot) = slot else {
            tracing::debug!(table = %row.table, index = %row.index_name, "index of unknown table ignored");
            continue;
        };
        let entity = &mut entities[slot];
        let index = match entity.indexes.iter().position(|i| i.name == row.index_name) {
            Some(at) => &mut entity.indexes[at],
            None => {
                entity.indexes.push(Index::new(
                    &row.index_name,
                    row.is_unique,
                    row.is_primary_key,
                ));
                created += 1;
                let last = entity.indexes.len() - 1;
                &mut entity.indexes[last]
            }
        };
        index.push_column(&row.column_name);
    }
    created
}
