//! Fatal errors.
//!
//! These abort the run and no model is produced. Recoverable problems are
//! [`Diagnostic`](crate::diagnostics::Diagnostic)s instead.

use std::fmt;

use thiserror::Error;

use crate::config::ConnectionError;
use crate::worker::WorkerError;

/// Result type for introspection operations.
pub type IntrospectResult<T> = Result<T, IntrospectError>;

/// Which metadata query was running when something failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataPhase {
    Tables,
    Columns,
    Indexes,
    ForeignKeys,
    /// Create/use/drop/exists database statements.
    Fixture,
}

impl fmt::Display for MetadataPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataPhase::Tables => write!(f, "tables"),
            MetadataPhase::Columns => write!(f, "columns"),
            MetadataPhase::Indexes => write!(f, "indexes"),
            MetadataPhase::ForeignKeys => write!(f, "foreign keys"),
            MetadataPhase::Fixture => write!(f, "fixture"),
        }
    }
}

/// Errors that abort an introspection run.
#[derive(Error, Debug)]
pub enum IntrospectError {
    /// The session could not be opened.
    #[error("failed to connect to {dialect}: {message}")]
    Connect {
        dialect: &'static str,
        message: String,
    },

    /// A metadata query failed.
    #[error("{phase} query failed: {message}")]
    Query {
        phase: MetadataPhase,
        message: String,
    },

    /// A query was issued before `connect` or after `disconnect`.
    #[error("adapter is not connected")]
    NotConnected,

    /// A database name passed to a fixture operation is not a plain identifier.
    #[error("invalid database name: {0:?}")]
    InvalidIdentifier(String),

    /// A row had an unexpected shape.
    #[error("malformed {phase} row: {message}")]
    MalformedRow {
        phase: MetadataPhase,
        message: String,
    },

    #[error(transparent)]
    Worker(#[from] WorkerError),

    #[error(transparent)]
    Config(#[from] ConnectionError),

    #[error("failed to read snapshot: {0}")]
    SnapshotIo(#[from] std::io::Error),

    #[error("invalid snapshot: {0}")]
    SnapshotFormat(#[from] serde_json::Error),
}

impl IntrospectError {
    pub fn connect(dialect: &'static str, err: impl fmt::Display) -> Self {
        Self::Connect {
            dialect,
            message: err.to_string(),
        }
    }

    pub fn query(phase: MetadataPhase, err: impl fmt::Display) -> Self {
        Self::Query {
            phase,
            message: err.to_string(),
        }
    }

    pub fn malformed(phase: MetadataPhase, message: impl Into<String>) -> Self {
        Self::MalformedRow {
            phase,
            message: message.into(),
        }
    }
}
