//! Worker-specific error types.

use std::io;
use thiserror::Error;

use super::protocol::codes;

/// Result type for worker operations.
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors that can occur during worker communication.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("worker binary not found; set [worker] path in schemalens.toml")]
    NotFound,

    #[error("failed to spawn worker process: {0}")]
    SpawnFailed(#[source] io::Error),

    #[error("failed to write to worker: {0}")]
    WriteFailed(#[source] io::Error),

    #[error("failed to serialize request: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    #[error("failed to deserialize response: {0}")]
    DeserializeFailed(#[source] serde_json::Error),

    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("worker process exited unexpectedly")]
    WorkerExited,

    /// Response channel was dropped before a response arrived.
    #[error("response channel closed unexpectedly")]
    ChannelClosed,

    #[error("database driver not found: {0}")]
    DriverNotFound(String),

    #[error("database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// Any other error response.
    #[error("worker error: {message} (code: {code})")]
    Remote { code: String, message: String },
}

impl WorkerError {
    pub fn remote(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Map an error response to a variant.
    pub fn classify(code: &str, message: &str) -> Self {
        match code {
            codes::DRIVER_NOT_FOUND => Self::DriverNotFound(message.to_string()),
            codes::CONNECTION_FAILED => Self::ConnectionFailed(message.to_string()),
            codes::INVALID_REQUEST => Self::InvalidRequest(message.to_string()),
            codes::METHOD_NOT_FOUND => Self::MethodNotFound(message.to_string()),
            codes::WORKER_EXITED => Self::WorkerExited,
            _ => Self::remote(code, message),
        }
    }

    pub fn is_worker_exited(&self) -> bool {
        matches!(self, Self::WorkerExited | Self::ChannelClosed)
    }

    /// Whether the failure came from reaching the database rather than
    /// from running a statement.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_) | Self::DriverNotFound(_) | Self::NotFound | Self::SpawnFailed(_)
        )
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for WorkerError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Self::ChannelClosed
    }
}
