//! TOML-based configuration for schemalens.
//!
//! Supports a config file (schemalens.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [connections.library]
//! driver = "mssql"
//! host = "db01.internal"
//! database = "library"
//! user = "inspector"
//! password = "${LIBRARY_DB_PASSWORD}"
//! encrypt = true
//! schemas = ["dbo", "sales"]
//!
//! [connections.local]
//! driver = "postgres"
//! host = "localhost"
//! database = "library"
//!
//! [worker]
//! path = "./schemalens-worker"
//! timeout_secs = 60
//!
//! [naming]
//! strategy = "plain"
//! ```

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use super::connection::{ConnectionConfig, Driver};
use crate::inference::NamingStrategy;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error("Unsupported driver: {0}")]
    UnsupportedDriver(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Named database connections.
    pub connections: HashMap<String, ConnectionSettings>,

    /// Worker process configuration (SQL Server).
    pub worker: WorkerSettings,

    /// Synthetic column naming.
    pub naming: NamingSettings,
}

/// One named connection.
///
/// String fields support `${VAR}` / `$VAR` expansion.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Database driver (mssql, postgres, mysql).
    pub driver: String,
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    pub database: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub encrypt: bool,
    /// Schemas to inspect; the driver default when empty.
    #[serde(default)]
    pub schemas: Vec<String>,
}

impl ConnectionSettings {
    pub fn driver_type(&self) -> Result<Driver, SettingsError> {
        Driver::from_str(&self.driver)
            .map_err(|_| SettingsError::UnsupportedDriver(self.driver.clone()))
    }

    /// Expand environment variables and build a [`ConnectionConfig`].
    pub fn resolve(&self) -> Result<ConnectionConfig, SettingsError> {
        let driver = self.driver_type()?;
        let optional = |value: &Option<String>| -> Result<Option<String>, SettingsError> {
            value.as_deref().map(expand_env_vars).transpose()
        };

        Ok(ConnectionConfig {
            driver,
            host: expand_env_vars(&self.host)?,
            port: self.port,
            database: expand_env_vars(&self.database)?,
            user: optional(&self.user)?,
            password: optional(&self.password)?,
            encrypt: self.encrypt,
            schemas: self
                .schemas
                .iter()
                .map(|s| expand_env_vars(s))
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Worker process configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Path to the worker binary. Searched for when unset.
    pub path: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            path: None,
            timeout_secs: 30,
        }
    }
}

/// Synthetic column naming configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NamingSettings {
    pub strategy: NamingStrategy,
}

const WORKER_BINARY: &str = "schemalens-worker";

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `SCHEMALENS_CONFIG`
    /// 2. `./schemalens.toml`
    /// 3. `~/.config/schemalens/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("SCHEMALENS_CONFIG") {
            return Self::from_file(path);
        }

        let local_config = PathBuf::from("schemalens.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("schemalens").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Get a connection by name.
    pub fn get_connection(&self, name: &str) -> Result<&ConnectionSettings, SettingsError> {
        self.connections
            .get(name)
            .ok_or_else(|| SettingsError::ConnectionNotFound(name.to_string()))
    }

    /// Locate the worker binary: configured path first, then the working
    /// directory, then `PATH`.
    pub fn worker_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.worker.path {
            return expand_env_vars(path).ok().map(PathBuf::from);
        }

        let local = [
            PathBuf::from(WORKER_BINARY),
            Path::new("worker").join(WORKER_BINARY),
        ];
        if let Some(found) = local.into_iter().find(|p| p.exists()) {
            return Some(found);
        }

        env::var_os("PATH").and_then(|paths| {
            env::split_paths(&paths)
                .map(|dir| dir.join(WORKER_BINARY))
                .find(|candidate| candidate.is_file())
        })
    }
}

static ENV_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([^}]*)\}|\$([A-Za-z0-9_]+)").expect("valid env reference pattern")
});

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    expand_with(s, |name| env::var(name).ok())
}

/// Expand `${VAR}` / `$VAR` references through `lookup`.
pub fn expand_with<F>(s: &str, lookup: F) -> Result<String, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing = None;
    let expanded = ENV_REFERENCE.replace_all(s, |caps: &Captures| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        match lookup(name) {
            Some(value) => value,
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(SettingsError::MissingEnvVar(name)),
        None => Ok(expanded.into_owned()),
    }
}
