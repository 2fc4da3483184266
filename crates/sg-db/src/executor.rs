//! Migration sequencing and execution.
//!
//! A migration runs in two phases. Reservation happens under a
//! per-namespace lock: the ledger is checked for conflicts and a Pending
//! record claims the next sequence. Execution happens outside the lock and
//! finalizes the record as DONE or FAILED. Multi-statement scripts are not
//! wrapped in a transaction, so a failure part-way leaves earlier
//! statements applied.

use crate::error::{DbError, MigrationError, MigrationResult};
use crate::traits::{Driver, Reservation};
use sg_core::{
    from_stored_version, to_stored_version, MigrationConfig, MigrationHistoryFind, MigrationInfo,
    MigrationKind, MigrationStatus, Namespace,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::OwnedMutexGuard;

/// Result of a successful migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub id: i64,
    pub sequence: i64,
    /// Schema after the migration
    pub schema: String,
}

/// One async mutex per namespace, created on first use.
#[derive(Default)]
pub struct NamespaceLocks {
    locks: Mutex<HashMap<Namespace, Arc<tokio::sync::Mutex<()>>>>,
}

impl NamespaceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait up to `timeout` for exclusive access to `namespace`.
    pub async fn acquire(
        &self,
        namespace: &Namespace,
        timeout: Duration,
    ) -> MigrationResult<OwnedMutexGuard<()>> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
            Arc::clone(locks.entry(namespace.clone()).or_default())
        };
        tokio::time::timeout(timeout, lock.lock_owned())
            .await
            .map_err(|_| MigrationError::LockTimeout {
                namespace: namespace.clone(),
                waited_ms: duration_ms(timeout),
            })
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Runs migrations against one target through a [`Driver`].
pub struct MigrationExecutor {
    driver: Arc<dyn Driver>,
    locks: NamespaceLocks,
    lock_timeout: Duration,
    execute_timeout: Duration,
}

impl MigrationExecutor {
    pub fn new(driver: Arc<dyn Driver>, config: &MigrationConfig) -> Self {
        Self {
            driver,
            locks: NamespaceLocks::new(),
            lock_timeout: config.lock_timeout(),
            execute_timeout: config.execute_timeout(),
        }
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    pub fn locks(&self) -> &NamespaceLocks {
        &self.locks
    }

    /// Record and run `statement` as the migration described by `info`.
    ///
    /// Errors before the Pending record is written leave the ledger
    /// untouched. Once it is written the record always ends DONE or
    /// FAILED, except when the ledger itself cannot be updated, in which
    /// case it stays PENDING and blocks the namespace until reconciled.
    /// Failures are never retried here; a retry is a new call with a new
    /// sequence.
    pub async fn execute_migration(
        &self,
        info: &MigrationInfo,
        statement: &str,
    ) -> MigrationResult<MigrationOutcome> {
        self.driver.setup_migration_if_needed().await?;
        let stored_version = to_stored_version(
            info.use_semantic_version,
            &info.version,
            &info.semantic_version_suffix,
        )?;

        let reservation = self.begin(info, &stored_version, statement).await?;
        log::info!(
            "Applying migration {} version {} to {} (sequence {})",
            reservation.id,
            info.version,
            info.namespace,
            reservation.sequence
        );

        // Includes any wait for the driver's connection.
        let started = Instant::now();
        let result = tokio::time::timeout(self.execute_timeout, self.driver.execute(statement)).await;
        let duration = started.elapsed();

        match result {
            Ok(Ok(())) => {
                let schema = match self.driver.dump_schema().await {
                    Ok(schema) => schema,
                    Err(e) => {
                        self.mark_failed(reservation.id, duration).await;
                        return Err(e.into());
                    }
                };
                self.driver
                    .update_history_as_done(reservation.id, duration, &schema)
                    .await?;
                log::info!(
                    "Migration {} done in {:?}",
                    reservation.id,
                    duration
                );
                Ok(MigrationOutcome {
                    id: reservation.id,
                    sequence: reservation.sequence,
                    schema,
                })
            }
            Ok(Err(source)) => {
                log::warn!("Migration {} failed: {}", reservation.id, source);
                self.mark_failed(reservation.id, duration).await;
                Err(MigrationError::ExecutionFailed {
                    namespace: info.namespace.clone(),
                    id: reservation.id,
                    source,
                })
            }
            Err(_) => {
                log::warn!(
                    "Migration {} exceeded {:?}, interrupting",
                    reservation.id,
                    self.execute_timeout
                );
                self.driver.interrupt();
                self.mark_failed(reservation.id, duration).await;
                Err(MigrationError::ExecutionTimeout {
                    namespace: info.namespace.clone(),
                    id: reservation.id,
                    timeout_ms: duration_ms(self.execute_timeout),
                })
            }
        }
    }

    /// Validate ordering and write the Pending record under the namespace
    /// lock.
    async fn begin(
        &self,
        info: &MigrationInfo,
        stored_version: &str,
        statement: &str,
    ) -> MigrationResult<Reservation> {
        let namespace = &info.namespace;
        let _guard = self.locks.acquire(namespace, self.lock_timeout).await?;

        let pending = self
            .driver
            .find_migration_history_list(&MigrationHistoryFind {
                namespace: Some(namespace.clone()),
                status: Some(MigrationStatus::Pending),
                limit: Some(1),
                ..Default::default()
            })
            .await?;
        if let Some(record) = pending.first() {
            return Err(MigrationError::NamespaceBusy {
                namespace: namespace.clone(),
                id: record.id,
            });
        }

        let applied = self
            .driver
            .find_migration_history_list(&MigrationHistoryFind {
                namespace: Some(namespace.clone()),
                version: Some(info.version.clone()),
                use_semantic_version: Some(info.use_semantic_version),
                status: Some(MigrationStatus::Done),
                limit: Some(1),
                ..Default::default()
            })
            .await?;
        if let Some(record) = applied.first() {
            return Err(MigrationError::VersionConflict {
                namespace: namespace.clone(),
                version: info.version.clone(),
                reason: format!("already applied by migration {}", record.id),
            });
        }

        if info.kind == MigrationKind::Migrate {
            if let Some(largest) = self
                .driver
                .find_largest_version_since_baseline(namespace)
                .await?
            {
                if stored_version < largest.as_str() {
                    let largest = from_stored_version(&largest)?;
                    return Err(MigrationError::VersionConflict {
                        namespace: namespace.clone(),
                        version: info.version.clone(),
                        reason: format!(
                            "must be at least {}, the latest version since baseline",
                            largest.version
                        ),
                    });
                }
            }
        }

        let sequence = self.driver.find_largest_sequence(namespace, false).await?;
        let schema_prev = self.driver.dump_schema().await?;
        let reservation = self
            .driver
            .insert_pending_history(sequence, &schema_prev, info, stored_version, statement)
            .await?;
        Ok(reservation)
    }

    /// Best-effort FAILED transition; the caller reports the original error.
    async fn mark_failed(&self, id: i64, duration: Duration) {
        if let Err(e) = self.driver.update_history_as_failed(id, duration).await {
            log::warn!(
                "Could not mark migration {} as failed, it stays PENDING: {}",
                id,
                e
            );
        }
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
