use super::*;
use crate::sqlite::SqliteDriver;

fn ns(name: &str) -> Namespace {
    Namespace::parse(name).unwrap()
}

fn executor() -> MigrationExecutor {
    let driver: Arc<dyn Driver> = Arc::new(SqliteDriver::in_memory().unwrap());
    MigrationExecutor::new(driver, &MigrationConfig::default())
}

#[tokio::test]
async fn test_lock_times_out_while_held() {
    let locks = NamespaceLocks::new();
    let _held = locks
        .acquire(&ns("app"), Duration::from_millis(50))
        .await
        .unwrap();

    let err = locks
        .acquire(&ns("app"), Duration::from_millis(20))
        .await
        .unwrap_err();
    assert!(matches!(err, MigrationError::LockTimeout { waited_ms: 20, .. }));
}

#[tokio::test]
async fn test_locks_are_per_namespace() {
    let locks = NamespaceLocks::new();
    let _app = locks
        .acquire(&ns("app"), Duration::from_millis(50))
        .await
        .unwrap();
    locks
        .acquire(&ns("other"), Duration::from_millis(50))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_lock_released_on_drop() {
    let locks = NamespaceLocks::new();
    let held = locks
        .acquire(&ns("app"), Duration::from_millis(50))
        .await
        .unwrap();
    drop(held);
    locks
        .acquire(&ns("app"), Duration::from_millis(50))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_first_migration_sets_up_ledger() {
    let executor = executor();
    assert!(executor.driver().needs_setup_migration().await.unwrap());

    let info = MigrationInfo::new(ns("app"), "1.0.0", MigrationKind::Migrate);
    let outcome = executor
        .execute_migration(&info, "CREATE TABLE book (id INTEGER PRIMARY KEY)")
        .await
        .unwrap();

    assert_eq!(outcome.sequence, 1);
    assert_eq!(outcome.schema, "CREATE TABLE book (id INTEGER PRIMARY KEY);\n");
    assert!(!executor.driver().needs_setup_migration().await.unwrap());
}

#[tokio::test]
async fn test_invalid_version_writes_nothing() {
    let executor = executor();
    let mut info = MigrationInfo::new(ns("app"), "1.0.0", MigrationKind::Migrate);
    info.version = "0.0.0".to_string();

    let err = executor
        .execute_migration(&info, "CREATE TABLE book (id INT)")
        .await
        .unwrap_err();
    assert!(matches!(err, MigrationError::Core(_)));

    let history = executor
        .driver()
        .find_migration_history_list(&MigrationHistoryFind::default())
        .await
        .unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_legacy_version_applied_twice_conflicts() {
    let executor = executor();
    let mut info = MigrationInfo::new(ns("app"), "1.0.0", MigrationKind::Migrate);
    info.use_semantic_version = false;

    executor
        .execute_migration(&info, "CREATE TABLE book (id INT)")
        .await
        .unwrap();
    let err = executor
        .execute_migration(&info, "CREATE TABLE author (id INT)")
        .await
        .unwrap_err();
    assert!(matches!(err, MigrationError::VersionConflict { .. }));
}
