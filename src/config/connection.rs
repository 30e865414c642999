//! Database connection configuration.
//!
//! Supports configuration via environment variables:
//! - `SCHEMALENS_DB_DRIVER`: Database driver (mssql, postgres, mysql)
//! - `SCHEMALENS_DB_HOST`: Database server hostname
//! - `SCHEMALENS_DB_NAME`: Database name
//! - `SCHEMALENS_DB_PORT`: Port (optional, uses driver default)
//! - `SCHEMALENS_DB_USER` / `SCHEMALENS_DB_PASSWORD`: Credentials (optional)
//! - `SCHEMALENS_DB_ENCRYPT`: `true`/`1`/`yes` to require TLS (optional)
//! - `SCHEMALENS_DB_SCHEMAS`: Comma separated schema list (optional)

use std::env;

use serde::{Deserialize, Serialize};

use crate::metadata::SchemaFilter;

/// Error type for connection configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unsupported driver: {0}. Supported: mssql, postgres, mysql")]
    UnsupportedDriver(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Supported database engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    /// Microsoft SQL Server (through the worker process)
    MsSql,
    /// PostgreSQL
    Postgres,
    /// MySQL and MariaDB
    MySql,
}

impl Driver {
    /// Parse driver from string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConnectionError> {
        match s.to_lowercase().as_str() {
            "mssql" | "sqlserver" | "sql_server" => Ok(Driver::MsSql),
            "postgres" | "postgresql" | "pg" => Ok(Driver::Postgres),
            "mysql" | "mariadb" => Ok(Driver::MySql),
            other => Err(ConnectionError::UnsupportedDriver(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Driver::MsSql => "mssql",
            Driver::Postgres => "postgres",
            Driver::MySql => "mysql",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Driver::MsSql => 1433,
            Driver::Postgres => 5432,
            Driver::MySql => 3306,
        }
    }

    /// Schema inspected when none is configured.
    ///
    /// MySQL has no schemas below the database, so the database name is used.
    pub fn default_schema(&self, database: &str) -> String {
        match self {
            Driver::MsSql => "dbo".to_string(),
            Driver::Postgres => "public".to_string(),
            Driver::MySql => database.to_string(),
        }
    }
}

/// Database connection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub driver: Driver,
    pub host: String,
    /// Uses the driver default when unset.
    pub port: Option<u16>,
    pub database: String,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Require an encrypted transport.
    pub encrypt: bool,
    /// Schemas to inspect. Empty means the driver default.
    pub schemas: Vec<String>,
}

impl ConnectionConfig {
    pub fn new(driver: Driver, host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            driver,
            host: host.into(),
            port: None,
            database: database.into(),
            user: None,
            password: None,
            encrypt: false,
            schemas: Vec::new(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_encrypt(mut self, encrypt: bool) -> Self {
        self.encrypt = encrypt;
        self
    }

    pub fn with_schemas<I, S>(mut self, schemas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schemas = schemas.into_iter().map(Into::into).collect();
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConnectionError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConnectionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| ConnectionError::MissingEnvVar(key.to_string()))
        };

        let driver = Driver::from_str(&required("SCHEMALENS_DB_DRIVER")?)?;
        let host = required("SCHEMALENS_DB_HOST")?;
        let database = required("SCHEMALENS_DB_NAME")?;

        let port = match lookup("SCHEMALENS_DB_PORT") {
            Some(raw) => Some(raw.parse::<u16>().map_err(|_| {
                ConnectionError::InvalidConfig(format!("invalid port: {}", raw))
            })?),
            None => None,
        };

        let encrypt = lookup("SCHEMALENS_DB_ENCRYPT")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        let schemas = lookup("SCHEMALENS_DB_SCHEMAS")
            .map(|v| split_schemas(&v))
            .unwrap_or_default();

        Ok(Self {
            driver,
            host,
            port,
            database,
            user: lookup("SCHEMALENS_DB_USER"),
            password: lookup("SCHEMALENS_DB_PASSWORD"),
            encrypt,
            schemas,
        })
    }

    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or_else(|| self.driver.default_port())
    }

    /// Schemas to inspect, falling back to the driver default.
    pub fn schema_filter(&self) -> Result<SchemaFilter, ConnectionError> {
        if self.schemas.iter().all(|s| s.trim().is_empty()) {
            SchemaFilter::single(self.driver.default_schema(&self.database))
        } else {
            SchemaFilter::new(self.schemas.iter().cloned())
        }
    }

    /// Connection string understood by the worker's SQL Server driver.
    pub fn to_worker_connection_string(&self) -> String {
        let mut params = vec![format!("database={}", self.database)];

        match (&self.user, &self.password) {
            (Some(user), Some(pass)) => {
                params.push(format!("user id={}", user));
                params.push(format!("password={}", pass));
            }
            (Some(user), None) => params.push(format!("user id={}", user)),
            _ => params.push("trusted_connection=true".to_string()),
        }

        params.push(format!("encrypt={}", self.encrypt));
        params.push("app name=schemalens".to_string());

        format!(
            "sqlserver://{}:{}?{}",
            self.host,
            self.port_or_default(),
            params.join("&")
        )
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn split_schemas(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
