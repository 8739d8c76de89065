//! Configuration file
//!
//! A single JSON object; every field is optional. A missing file means
//! "all defaults".
//!
//! ```json
//! {
//!   "database_path": "./crudgate.db",
//!   "host": "127.0.0.1",
//!   "port": 8000,
//!   "pool_size": 4,
//!   "statement_timeout_ms": 5000,
//!   "busy_timeout_ms": 100,
//!   "retry_delay_ms": 100
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::executor::ExecutorConfig;
use crate::http_server::HttpServerConfig;
use crate::schema::{ResourceDef, SchemaRegistry};

use super::errors::{CliError, CliResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Transport settings (`host`, `port`, `cors_origins`)
    #[serde(default, flatten)]
    pub http: HttpServerConfig,

    /// Maximum open store connections
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Bound on one store round trip
    #[serde(default = "default_statement_timeout_ms")]
    pub statement_timeout_ms: u64,

    /// How long SQLite waits on a locked database
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Pause before retrying an unavailable store
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Resource descriptors; the built-in `music` resource when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<ResourceDef>>,
}

fn default_database_path() -> String {
    "./crudgate.db".to_string()
}

fn default_pool_size() -> usize {
    4
}

fn default_statement_timeout_ms() -> u64 {
    5_000
}

fn default_busy_timeout_ms() -> u64 {
    100
}

fn default_retry_delay_ms() -> u64 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            http: HttpServerConfig::default(),
            pool_size: default_pool_size(),
            statement_timeout_ms: default_statement_timeout_ms(),
            busy_timeout_ms: default_busy_timeout_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            resources: None,
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults if it is absent
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        Self::parse(&content)
    }

    /// Parse and validate configuration JSON
    pub fn parse(content: &str) -> CliResult<Self> {
        let config: Config = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.database_path.trim().is_empty() {
            return Err(CliError::config_error("database_path must not be empty"));
        }

        if self.pool_size == 0 {
            return Err(CliError::config_error("pool_size must be > 0"));
        }

        if self.statement_timeout_ms == 0 {
            return Err(CliError::config_error("statement_timeout_ms must be > 0"));
        }

        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.database_path)
    }

    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            pool_size: self.pool_size,
            statement_timeout: Duration::from_millis(self.statement_timeout_ms),
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    /// Build and validate the schema registry
    pub fn registry(&self) -> CliResult<SchemaRegistry> {
        let registry = match &self.resources {
            Some(resources) => SchemaRegistry::new(resources.clone())?,
            None => SchemaRegistry::builtin()?,
        };
        Ok(registry)
    }
}
