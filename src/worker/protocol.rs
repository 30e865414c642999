//! Wire types for the SQL Server worker.
//!
//! One JSON object per line in each direction. Requests carry a caller
//! chosen `id` that the matching response echoes back.

use serde::{Deserialize, Serialize};

// ============================================================================
// Envelopes
// ============================================================================

/// Request envelope sent to the worker.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope {
    /// Correlation ID.
    pub id: String,
    /// Method name, see [`methods`].
    pub method: String,
    pub params: serde_json::Value,
}

/// Response envelope received from the worker.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    pub id: String,
    pub success: bool,
    /// Present when `success` is true.
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Present when `success` is false.
    #[serde(default)]
    pub error: Option<ErrorInfo>,
}

/// Error information in a failed response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl ErrorInfo {
    pub(crate) fn worker_exited() -> Self {
        Self {
            code: codes::WORKER_EXITED.to_string(),
            message: "worker process exited unexpectedly".to_string(),
        }
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// Connection parameters, flattened into every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Worker driver name, `mssql` for SQL Server.
    pub driver: String,
    pub connection_string: String,
}

/// Parameters for `query.execute`.
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteQueryParams {
    #[serde(flatten)]
    pub connection: ConnectionParams,
    pub sql: String,
    /// Positional arguments bound as `@p1`, `@p2`, ...
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<serde_json::Value>>,
}

// ============================================================================
// Results
// ============================================================================

/// Column description in a query result.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResultColumn {
    /// Column name or alias.
    pub name: String,
    /// Database-specific type.
    pub data_type: String,
}

/// Response from `query.execute`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecuteQueryResponse {
    pub columns: Vec<QueryResultColumn>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub row_count: i32,
    /// Set for statements that modify data.
    #[serde(default)]
    pub rows_affected: Option<i64>,
}

impl ExecuteQueryResponse {
    /// Position of a result column, compared case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }
}

// ============================================================================
// Names
// ============================================================================

/// Worker method names.
pub mod methods {
    pub const EXECUTE_QUERY: &str = "query.execute";
}

/// Error codes the worker reports.
pub mod codes {
    pub const CONNECTION_FAILED: &str = "CONNECTION_FAILED";
    pub const DRIVER_NOT_FOUND: &str = "DRIVER_NOT_FOUND";
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    pub const METHOD_NOT_FOUND: &str = "METHOD_NOT_FOUND";
    pub const QUERY_FAILED: &str = "QUERY_FAILED";
    pub const WORKER_EXITED: &str = "WORKER_EXITED";
}
