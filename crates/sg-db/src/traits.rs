//! Driver trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use serde::Serialize;
use sg_core::{Engine, MigrationHistory, MigrationHistoryFind, MigrationInfo, Namespace};
use std::time::Duration;

/// Rows returned by [`Driver::query`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

/// A Pending ledger record written by [`Driver::insert_pending_history`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    pub id: i64,
    pub sequence: i64,
}

/// Target database driver.
///
/// Implementations must be Send + Sync; one driver may serve concurrent
/// checks and migrations.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Engine whose grammar the target speaks
    fn engine(&self) -> Engine;

    /// (Re)connect to the configured target
    async fn open(&self) -> DbResult<()>;

    /// Drop the connection; later calls fail with `NotConnected`
    async fn close(&self) -> DbResult<()>;

    async fn ping(&self) -> DbResult<()>;

    /// Execute one or more statements. Each statement commits on its own.
    async fn execute(&self, statement: &str) -> DbResult<()>;

    /// Run a query and return at most `limit` rows
    async fn query(&self, statement: &str, limit: usize) -> DbResult<QueryResult>;

    /// Server version string
    async fn version(&self) -> DbResult<String>;

    /// DDL of every user object, excluding the ledger
    async fn dump_schema(&self) -> DbResult<String>;

    /// Abort the statement currently running on this driver, if any
    fn interrupt(&self);

    async fn needs_setup_migration(&self) -> DbResult<bool>;

    /// Create or upgrade the ledger tables
    async fn setup_migration_if_needed(&self) -> DbResult<()>;

    /// Largest sequence in `namespace`, 0 when the history is empty.
    /// With `baseline_only`, only BASELINE and BRANCH records count.
    async fn find_largest_sequence(&self, namespace: &Namespace, baseline_only: bool)
        -> DbResult<i64>;

    /// Largest stored version at or after the latest baseline
    async fn find_largest_version_since_baseline(
        &self,
        namespace: &Namespace,
    ) -> DbResult<Option<String>>;

    /// Reserve `prior_sequence + 1` (or the next free sequence if a
    /// concurrent writer took it) and write a Pending record.
    async fn insert_pending_history(
        &self,
        prior_sequence: i64,
        schema_prev: &str,
        info: &MigrationInfo,
        stored_version: &str,
        statement: &str,
    ) -> DbResult<Reservation>;

    async fn update_history_as_done(
        &self,
        id: i64,
        duration: Duration,
        schema: &str,
    ) -> DbResult<()>;

    async fn update_history_as_failed(&self, id: i64, duration: Duration) -> DbResult<()>;

    /// History matching `find`, newest first
    async fn find_migration_history_list(
        &self,
        find: &MigrationHistoryFind,
    ) -> DbResult<Vec<MigrationHistory>>;
}
