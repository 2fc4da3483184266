//! Concurrent sequence reservation against one namespace

use sg_core::{to_stored_version, MigrationInfo, MigrationKind, Namespace};
use sg_db::{Driver, SqliteDriver};
use std::sync::Arc;

fn info(version: &str) -> MigrationInfo {
    MigrationInfo::new(Namespace::parse("app").unwrap(), version, MigrationKind::Migrate)
}

async fn reserve(driver: Arc<dyn Driver>, version: &'static str) -> i64 {
    let info = info(version);
    let stored = to_stored_version(true, version, "").unwrap();
    let prior = driver
        .find_largest_sequence(&info.namespace, false)
        .await
        .unwrap();
    driver
        .insert_pending_history(prior, "", &info, &stored, "SELECT 1")
        .await
        .unwrap()
        .sequence
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_driver_reserves_adjacent_sequences() {
    let driver: Arc<dyn Driver> = Arc::new(SqliteDriver::in_memory().unwrap());
    driver.setup_migration_if_needed().await.unwrap();

    let (a, b) = tokio::join!(
        tokio::spawn(reserve(Arc::clone(&driver), "1.0.0")),
        tokio::spawn(reserve(Arc::clone(&driver), "1.0.1")),
    );
    let mut sequences = vec![a.unwrap(), b.unwrap()];
    sequences.sort();
    assert_eq!(sequences, vec![1, 2]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_separate_connections_reserve_adjacent_sequences() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("target.db");
    let path = path.to_str().unwrap();

    let first: Arc<dyn Driver> = Arc::new(SqliteDriver::new(path).unwrap());
    let second: Arc<dyn Driver> = Arc::new(SqliteDriver::new(path).unwrap());
    first.setup_migration_if_needed().await.unwrap();

    // Both callers read the same prior sequence before either writes.
    let prior = first
        .find_largest_sequence(&Namespace::parse("app").unwrap(), false)
        .await
        .unwrap();
    let stored = to_stored_version(true, "1.0.0", "").unwrap();
    let info_a = info("1.0.0");
    let info_b = info("1.0.0");
    let (a, b) = tokio::join!(
        first.insert_pending_history(prior, "", &info_a, &stored, "SELECT 1"),
        second.insert_pending_history(prior, "", &info_b, &stored, "SELECT 1"),
    );
    let mut sequences = vec![a.unwrap().sequence, b.unwrap().sequence];
    sequences.sort();
    assert_eq!(sequences, vec![1, 2]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_writers_leave_no_gaps() {
    let driver: Arc<dyn Driver> = Arc::new(SqliteDriver::in_memory().unwrap());
    driver.setup_migration_if_needed().await.unwrap();

    let versions = ["1.0.0", "1.0.1", "1.0.2", "1.0.3", "1.0.4", "1.0.5"];
    let handles: Vec<_> = versions
        .iter()
        .map(|v| tokio::spawn(reserve(Arc::clone(&driver), *v)))
        .collect();
    let mut sequences = Vec::new();
    for handle in handles {
        sequences.push(handle.await.unwrap());
    }
    sequences.sort();
    assert_eq!(sequences, (1..=6).collect::<Vec<i64>>());
}
