//! Configuration types and parsing for schemagate.yml

use crate::engine::Engine;
use crate::error::{CoreError, CoreResult};
use crate::plan::Plan;
use crate::policy::Policy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Config file names looked up by [`Config::load_from_dir`], in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["schemagate.yml", "schemagate.yaml"];

/// Main configuration from schemagate.yml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Target engine; selects the SQL grammar and the applicable rules
    #[serde(default)]
    pub engine: Engine,

    /// Target database connection
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Charset passed to rules through the advisor context
    #[serde(default)]
    pub charset: Option<String>,

    /// Collation passed to rules through the advisor context
    #[serde(default)]
    pub collation: Option<String>,

    /// Licensed plan
    #[serde(default)]
    pub plan: Plan,

    /// Schema review policy; absent means checks degrade to a warning
    #[serde(default)]
    pub policy: Option<Policy>,

    /// Migration execution settings
    #[serde(default)]
    pub migration: MigrationConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database path (file-based or :memory:)
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Logical database name, used as the default namespace
    #[serde(default = "default_db_name")]
    pub name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            name: default_db_name(),
        }
    }
}

/// Migration executor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Upper bound on waiting for the per-namespace reservation lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    /// Upper bound on executing the migration statement, counted from the
    /// request to the driver. Time spent waiting for a connection the
    /// driver is busy with elsewhere is part of the budget.
    #[serde(default = "default_execute_timeout_ms")]
    pub execute_timeout_ms: u64,

    /// Attempts to reserve a sequence when the unique index reports a race
    #[serde(default = "default_reserve_retries")]
    pub reserve_retries: u32,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
            execute_timeout_ms: default_execute_timeout_ms(),
            reserve_retries: default_reserve_retries(),
        }
    }
}

impl MigrationConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn execute_timeout(&self) -> Duration {
        Duration::from_millis(self.execute_timeout_ms)
    }
}

const DEFAULT_DB_PATH: &str = ":memory:";

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

fn default_db_name() -> String {
    "main".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    5_000
}

fn default_execute_timeout_ms() -> u64 {
    600_000
}

fn default_reserve_retries() -> u32 {
    3
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                message: format!("{}: {e}", path.display()),
            })?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a directory
    /// Looks for schemagate.yml or schemagate.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.exists() {
                return Self::load(&candidate);
            }
        }
        Err(CoreError::ConfigNotFound {
            path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.database.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.name cannot be empty".to_string(),
            });
        }
        if self.database.path.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }
        if self.migration.lock_timeout_ms == 0 || self.migration.execute_timeout_ms == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "migration timeouts must be greater than zero".to_string(),
            });
        }
        if self.migration.reserve_retries == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "migration.reserve_retries must be at least 1".to_string(),
            });
        }
        if let Some(policy) = &self.policy {
            policy.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
