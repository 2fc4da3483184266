//! Runtime context for CLI commands

use anyhow::{Context, Result};
use sg_core::{Config, CoreError, Namespace, SnapshotCatalog};
use sg_db::SqliteDriver;
use std::path::Path;
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Loaded configuration plus the per-invocation flags commands need
pub(crate) struct RuntimeContext {
    pub config: Config,
}

impl RuntimeContext {
    /// Load config from `--config`, or from the project directory.
    ///
    /// A project directory without a config file runs on defaults; an
    /// explicit `--config` must exist.
    pub(crate) fn load(args: &GlobalArgs) -> Result<Self> {
        let config = if let Some(config_path) = &args.config {
            Config::load(Path::new(config_path)).context("Failed to load configuration file")?
        } else {
            match Config::load_from_dir(Path::new(&args.project_dir)) {
                Ok(config) => config,
                Err(CoreError::ConfigNotFound { path }) => {
                    log::debug!("No config at {}, using defaults", path);
                    Config::default()
                }
                Err(e) => return Err(e).context("Failed to load project configuration"),
            }
        };
        Ok(Self { config })
    }

    /// `name`, or the configured database name.
    pub(crate) fn namespace(&self, name: Option<&str>) -> Result<Namespace> {
        let name = name.unwrap_or(&self.config.database.name);
        Namespace::parse(name).with_context(|| format!("Invalid namespace '{name}'"))
    }

    /// Connect to the configured database.
    pub(crate) fn open_driver(&self) -> Result<Arc<SqliteDriver>> {
        let driver = SqliteDriver::new(&self.config.database.path)
            .with_context(|| format!("Failed to open database {}", self.config.database.path))?
            .with_reserve_retries(self.config.migration.reserve_retries);
        Ok(Arc::new(driver))
    }

    /// Index metadata for semantic rules. Only a SQLite target can be
    /// read; other engines are reviewed against an empty catalog.
    pub(crate) async fn catalog(&self, namespace: &Namespace) -> Result<SnapshotCatalog> {
        if self.config.engine != sg_core::Engine::Sqlite {
            return Ok(SnapshotCatalog::new());
        }
        let driver = self.open_driver()?;
        driver
            .catalog_snapshot(namespace)
            .await
            .context("Failed to read index metadata")
    }
}
