//! # Environment-Based Configuration
//!
//! Loads [`HttpRuntimeConfig`] from environment variables so deployments can
//! change settings without rebuilds.
//!
//! ## Environment Variables
//!
//! ### HTTP Runtime
//! - `TABVAULT_BIND_ADDR` - Listen address (default: `127.0.0.1:9000`)
//! - `TABVAULT_BACKUP_DIR` - Directory for backup artifacts (default: `backups`)
//! - `TABVAULT_MAX_BODY_SIZE` - Maximum request body size in bytes (default: 16777216 / 16MB)
//! - `TABVAULT_ENABLE_CORS` - Enable permissive CORS (default: false)
//!
//! ### Store
//! - `TABVAULT_DATA_DIR` - Directory database names resolve inside
//! - `TABVAULT_CREATE_DATABASES` - Create missing database files (default: true)
//! - `TABVAULT_BUSY_TIMEOUT_MS` - SQLite busy timeout (default: 5000)
//! - `TABVAULT_MAX_BATCH_ROWS` - Rows accepted per insert request (default: 10000)
//! - `TABVAULT_MAX_STATEMENT_PARAMS` - Bound parameters per INSERT statement (default: 999)
//! - `TABVAULT_STORE_UID` / `TABVAULT_STORE_PWD` - Login every request must present

use crate::runtime::HttpRuntimeConfig;
use std::{env, net::SocketAddr, path::PathBuf, str::FromStr};
use tabvault_core::TableId;
use tabvault_store::StoreConfig;

/// SQLite's compile-time ceiling on bound parameters.
const SQLITE_MAX_VARIABLE_NUMBER: usize = 32_766;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid environment variable '{key}': {message}")]
    InvalidEnvVar { key: String, message: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Builder for `HttpRuntimeConfig` with environment variable support
#[derive(Debug, Clone, Default)]
pub struct HttpRuntimeConfigBuilder {
    config: HttpRuntimeConfig,
}

impl HttpRuntimeConfigBuilder {
    /// Create a new builder with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any environment variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any value cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = EnvSource { lookup };
        let mut builder = Self::default();

        // HTTP runtime
        if let Some(addr) = vars.parsed::<SocketAddr>("TABVAULT_BIND_ADDR")? {
            builder = builder.bind_addr(addr);
        }
        if let Some(dir) = vars.string("TABVAULT_BACKUP_DIR") {
            builder = builder.backup_dir(dir);
        }
        if let Some(size) = vars.parsed::<usize>("TABVAULT_MAX_BODY_SIZE")? {
            builder = builder.max_body_size(size);
        }
        if let Some(cors) = vars.bool("TABVAULT_ENABLE_CORS")? {
            builder = builder.enable_cors(cors);
        }

        // Store
        let mut store = builder.config.store.clone();
        if let Some(dir) = vars.string("TABVAULT_DATA_DIR") {
            store.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(create) = vars.bool("TABVAULT_CREATE_DATABASES")? {
            store.create_if_missing = create;
        }
        if let Some(timeout) = vars.parsed::<u64>("TABVAULT_BUSY_TIMEOUT_MS")? {
            store.busy_timeout_ms = timeout;
        }
        if let Some(rows) = vars.parsed::<usize>("TABVAULT_MAX_BATCH_ROWS")? {
            store.max_batch_rows = rows;
        }
        if let Some(params) = vars.parsed::<usize>("TABVAULT_MAX_STATEMENT_PARAMS")? {
            store.max_statement_params = params;
        }
        match (vars.string("TABVAULT_STORE_UID"), vars.string("TABVAULT_STORE_PWD")) {
            (Some(uid), pwd) => store = store.with_required_login(uid, pwd.unwrap_or_default()),
            (None, Some(_)) => {
                return Err(ConfigError::InvalidEnvVar {
                    key: "TABVAULT_STORE_PWD".to_string(),
                    message: "set without TABVAULT_STORE_UID".to_string(),
                });
            }
            (None, None) => {}
        }

        Ok(builder.store(store))
    }

    /// Set the listen address
    #[must_use]
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.config.bind_addr = addr;
        self
    }

    /// Set the backup artifact directory
    #[must_use]
    pub fn backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.backup_dir = dir.into();
        self
    }

    /// Set maximum request body size in bytes
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    /// Enable or disable CORS
    #[must_use]
    pub fn enable_cors(mut self, enable: bool) -> Self {
        self.config.enable_cors = enable;
        self
    }

    /// Set the store configuration
    #[must_use]
    pub fn store(mut self, store: StoreConfig) -> Self {
        self.config.store = store;
        self
    }

    /// Set the directory database names resolve inside
    #[must_use]
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.store.data_dir = Some(dir.into());
        self
    }

    /// Validate configuration and build `HttpRuntimeConfig`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if the configuration is invalid.
    pub fn build(self) -> Result<HttpRuntimeConfig, ConfigError> {
        self.validate()?;
        Ok(self.config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let config = &self.config;

        if config.max_body_size == 0 {
            return Err(ConfigError::ValidationError(
                "max_body_size must be greater than 0".to_string(),
            ));
        }
        if config.max_body_size > 100 * 1024 * 1024 {
            return Err(ConfigError::ValidationError(
                "max_body_size must be <= 100MB".to_string(),
            ));
        }
        if config.backup_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "backup_dir cannot be empty".to_string(),
            ));
        }

        let store = &config.store;
        if store.max_batch_rows == 0 {
            return Err(ConfigError::ValidationError(
                "max_batch_rows must be greater than 0".to_string(),
            ));
        }

        // One row of the widest table has to fit in a single statement.
        let widest = TableId::ALL
            .iter()
            .map(|table| table.layout().columns.len())
            .max()
            .unwrap_or(1);
        if store.max_statement_params < widest {
            return Err(ConfigError::ValidationError(format!(
                "max_statement_params must be at least {widest}"
            )));
        }
        if store.max_statement_params > SQLITE_MAX_VARIABLE_NUMBER {
            return Err(ConfigError::ValidationError(format!(
                "max_statement_params must be <= {SQLITE_MAX_VARIABLE_NUMBER}"
            )));
        }

        Ok(())
    }
}

struct EnvSource<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> EnvSource<F> {
    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    fn bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        match self.string(key) {
            Some(val) => match val.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(Some(true)),
                "false" | "0" | "no" | "off" => Ok(Some(false)),
                _ => Err(ConfigError::InvalidEnvVar {
                    key: key.to_string(),
                    message: format!(
                        "invalid boolean value '{val}', expected true/false/1/0/yes/no/on/off"
                    ),
                }),
            },
            None => Ok(None),
        }
    }

    fn parsed<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.string(key) {
            Some(val) => val
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| ConfigError::InvalidEnvVar {
                    key: key.to_string(),
                    message: format!("invalid value '{val}': {e}"),
                }),
            None => Ok(None),
        }
    }
}
