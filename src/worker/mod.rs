//! SQL Server worker process.
//!
//! SQL Server metadata is read through an external worker binary rather
//! than an in-process driver. The worker owns the TDS connection; this side
//! only sends statements and reads back rows.
//!
//! ```text
//! ┌──────────────────────────────┐   stdin (NDJSON)   ┌──────────────────┐
//! │ MssqlAdapter                 │ ─────────────────▶ │ schemalens-worker│
//! │   └─ WorkerClient            │                    │   (child process)│
//! │        pending: id → oneshot │ ◀───────────────── │                  │
//! └──────────────────────────────┘   stdout (NDJSON)  └──────────────────┘
//! ```
//!
//! ```ignore
//! let client = WorkerClient::spawn("./schemalens-worker").await?;
//! let rows = client.execute_query(&connection, "SELECT name FROM sys.tables", None).await?;
//! ```

mod client;
mod error;
pub mod protocol;

pub use client::WorkerClient;
pub use error::{WorkerError, WorkerResult};
