//! Non-fatal findings collected during a run.
//!
//! Anything that makes the model incomplete without making it unusable is a
//! [`Diagnostic`]: an unmapped column type, a foreign key pointing outside the
//! inspected schemas, a column that vanished between queries. Diagnostics are
//! pushed into a [`DiagnosticSink`] that the caller owns and passes down.

use std::fmt;

/// A skipped item and the names involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Native type not present in the dialect's type map. The column is dropped.
    UnknownColumnType {
        native_type: String,
        table: String,
        column: String,
    },
    /// A relation endpoint names a table with no entity. The whole group is dropped.
    EntityNotFound {
        owner_table: String,
        referenced_table: String,
        missing: String,
    },
    /// A relation column pair names a missing column. Only that pair is dropped.
    ColumnNotFound {
        owner_table: String,
        referenced_table: String,
        table: String,
        column: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownColumnType {
                native_type,
                table,
                column,
            } => write!(
                f,
                "unknown column type: {} table:{} column:{}",
                native_type, table, column
            ),
            Diagnostic::EntityNotFound {
                owner_table,
                referenced_table,
                missing,
            } => write!(
                f,
                "relation between {} and {}: entity {} not found",
                owner_table, referenced_table, missing
            ),
            Diagnostic::ColumnNotFound {
                owner_table,
                referenced_table,
                table,
                column,
            } => write!(
                f,
                "relation between {} and {}: column {}.{} not found",
                owner_table, referenced_table, table, column
            ),
        }
    }
}

/// Receiver for diagnostics.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Default sink: keeps every diagnostic in order and logs it as a warning.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Counts per kind of skip.
    pub fn summary(&self) -> SkipSummary {
        let mut summary = SkipSummary::default();
        for entry in &self.entries {
            match entry {
                Diagnostic::UnknownColumnType { .. } => summary.skipped_columns += 1,
                Diagnostic::EntityNotFound { .. } => summary.dropped_relation_groups += 1,
                Diagnostic::ColumnNotFound { .. } => summary.dropped_column_pairs += 1,
            }
        }
        summary
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{}", diagnostic);
        self.entries.push(diagnostic);
    }
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// What a run skipped, by category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipSummary {
    /// Columns dropped for an unknown native type.
    pub skipped_columns: usize,
    /// Foreign-key groups dropped for a missing entity.
    pub dropped_relation_groups: usize,
    /// Foreign-key column pairs dropped for a missing column.
    pub dropped_column_pairs: usize,
}

impl SkipSummary {
    pub fn is_clean(&self) -> bool {
        *self == SkipSummary::default()
    }
}

impl fmt::Display for SkipSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return write!(f, "nothing skipped");
        }
        write!(
            f,
            "skipped {} column(s), {} relation group(s), {} column pair(s)",
            self.skipped_columns, self.dropped_relation_groups, self.dropped_column_pairs
        )
    }
}
