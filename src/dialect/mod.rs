//! Dialect adapters.
//!
//! One [`DialectAdapter`] per supported engine:
//!
//! | Driver     | Session                         | Schema default  |
//! |------------|---------------------------------|-----------------|
//! | SQL Server | worker process (`query.execute`)| `dbo`           |
//! | PostgreSQL | `sqlx::PgConnection`            | `public`        |
//! | MySQL      | `sqlx::MySqlConnection`         | database name   |
//!
//! Every adapter normalizes its catalog rows into the same
//! [`raw`](crate::metadata) shapes: referential actions become underscore
//! tokens (`NO_ACTION`, `SET_NULL`, ...), and native type names are
//! reported lower-case as the catalog spells them.

mod mssql;
mod mysql;
mod postgres;

use crate::config::{ConnectionConfig, Driver, Settings};
use crate::metadata::{DialectAdapter, TypeMapper};

pub use mssql::{MssqlAdapter, MSSQL_TYPES};
pub use mysql::{MySqlAdapter, MYSQL_TYPES};
pub use postgres::{PostgresAdapter, POSTGRES_TYPES};

/// Type table for a driver.
pub fn type_mapper_for(driver: Driver) -> &'static TypeMapper {
    match driver {
        Driver::MsSql => &MSSQL_TYPES,
        Driver::Postgres => &POSTGRES_TYPES,
        Driver::MySql => &MYSQL_TYPES,
    }
}

/// A fresh, unconnected adapter for `config.driver`.
///
/// SQL Server needs the worker binary; its location and timeout come from
/// `settings`.
pub fn adapter_for(config: &ConnectionConfig, settings: &Settings) -> Box<dyn DialectAdapter> {
    match config.driver {
        Driver::MsSql => Box::new(MssqlAdapter::from_settings(settings)),
        Driver::Postgres => Box::new(PostgresAdapter::new()),
        Driver::MySql => Box::new(MySqlAdapter::new()),
    }
}

/// Translate a catalog action spelling (`NO ACTION`, `set null`, ...) into
/// the underscore token form.
pub(crate) fn action_token(raw: &str) -> String {
    raw.trim().to_ascii_uppercase().replace(' ', "_")
}
