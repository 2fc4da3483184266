use super::*;
use crate::setup::run_migrations;
use sg_core::MigrationKind;

fn ledger() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    conn
}

fn ns(name: &str) -> Namespace {
    Namespace::parse(name).unwrap()
}

fn reserve(conn: &Connection, namespace: &str, version: &str, kind: MigrationKind) -> Reservation {
    let info = MigrationInfo::new(ns(namespace), version, kind);
    let prior = largest_sequence(conn, &info.namespace, false).unwrap();
    let stored = to_stored_version(info.use_semantic_version, &info.version, "").unwrap();
    insert_pending(conn, prior, "", &info, &stored, "SELECT 1", 3).unwrap()
}

fn insert_raw(conn: &Connection, namespace: &str, sequence: i64, version: &str) {
    conn.execute(
        "INSERT INTO sg_migration_history (
            created_by, created_ts, updated_by, updated_ts, release_version, namespace,
            sequence, source, type, status, version, description, statement, schema,
            schema_prev, execution_duration_ns, issue_id, payload
        ) VALUES ('legacy', 0, 'legacy', 0, '', ?1, ?2, 'UI', 'MIGRATE', 'DONE', ?3,
                  '', '', '', '', 0, '', '')",
        params![namespace, sequence, version],
    )
    .unwrap();
}

#[test]
fn test_empty_namespace_starts_at_one() {
    let conn = ledger();
    assert_eq!(largest_sequence(&conn, &ns("app"), false).unwrap(), 0);
    assert_eq!(largest_sequence(&conn, &ns("app"), true).unwrap(), 0);

    let first = reserve(&conn, "app", "1.0.0", MigrationKind::Migrate);
    assert_eq!(first.sequence, 1);
}

#[test]
fn test_baseline_only_sequence() {
    let conn = ledger();
    reserve(&conn, "app", "1.0.0", MigrationKind::Migrate);
    reserve(&conn, "app", "2.0.0", MigrationKind::Baseline);
    reserve(&conn, "app", "2.1.0", MigrationKind::Migrate);

    assert_eq!(largest_sequence(&conn, &ns("app"), false).unwrap(), 3);
    assert_eq!(largest_sequence(&conn, &ns("app"), true).unwrap(), 2);
}

#[test]
fn test_namespaces_are_independent() {
    let conn = ledger();
    reserve(&conn, "app", "1.0.0", MigrationKind::Migrate);
    reserve(&conn, "app", "1.1.0", MigrationKind::Migrate);
    let other = reserve(&conn, "other", "1.0.0", MigrationKind::Migrate);
    assert_eq!(other.sequence, 1);
}

#[test]
fn test_stale_prior_sequence_moves_to_next_free() {
    let conn = ledger();
    let info = MigrationInfo::new(ns("app"), "1.0.0", MigrationKind::Migrate);
    let stored = to_stored_version(true, "1.0.0", "").unwrap();

    let first = insert_pending(&conn, 0, "", &info, &stored, "SELECT 1", 3).unwrap();
    let second = insert_pending(&conn, 0, "", &info, &stored, "SELECT 1", 3).unwrap();
    assert_eq!(first.sequence, 1);
    assert_eq!(second.sequence, 2);
    assert_ne!(first.id, second.id);
}

#[test]
fn test_reservation_gives_up_after_attempts() {
    let conn = ledger();
    let info = MigrationInfo::new(ns("app"), "1.0.0", MigrationKind::Migrate);
    let stored = to_stored_version(true, "1.0.0", "").unwrap();

    insert_pending(&conn, 0, "", &info, &stored, "SELECT 1", 1).unwrap();
    let err = insert_pending(&conn, 0, "", &info, &stored, "SELECT 1", 1).unwrap_err();
    assert!(matches!(
        err,
        DbError::SequenceConflict {
            sequence: 1,
            attempts: 1,
            ..
        }
    ));
}

#[test]
fn test_largest_version_since_baseline() {
    let conn = ledger();
    assert_eq!(
        largest_version_since_baseline(&conn, &ns("app")).unwrap(),
        None
    );

    reserve(&conn, "app", "3.0.0", MigrationKind::Migrate);
    reserve(&conn, "app", "1.0.0", MigrationKind::Baseline);
    reserve(&conn, "app", "1.1.0", MigrationKind::Migrate);

    assert_eq!(
        largest_version_since_baseline(&conn, &ns("app")).unwrap(),
        Some("0001.0001.0000-".to_string())
    );
}

#[test]
fn test_finalize_once() {
    let conn = ledger();
    let reservation = reserve(&conn, "app", "1.0.0", MigrationKind::Migrate);

    finalize(
        &conn,
        reservation.id,
        MigrationStatus::Done,
        Duration::from_millis(5),
        Some("CREATE TABLE t (id INT);\n"),
    )
    .unwrap();

    let err = finalize(
        &conn,
        reservation.id,
        MigrationStatus::Failed,
        Duration::ZERO,
        None,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        DbError::NotPending {
            status: MigrationStatus::Done,
            ..
        }
    ));

    let record = &find_history(
        &conn,
        &MigrationHistoryFind {
            id: Some(reservation.id),
            ..Default::default()
        },
    )
    .unwrap()[0];
    assert_eq!(record.status, MigrationStatus::Done);
    assert_eq!(record.schema, "CREATE TABLE t (id INT);\n");
    assert_eq!(record.execution_duration_ns, 5_000_000);
}

#[test]
fn test_finalize_missing_record() {
    let conn = ledger();
    let err = finalize(&conn, 42, MigrationStatus::Failed, Duration::ZERO, None).unwrap_err();
    assert!(matches!(err, DbError::HistoryNotFound { id: 42 }));
}

#[test]
fn test_find_history_filters_and_order() {
    let conn = ledger();
    reserve(&conn, "app", "1.0.0", MigrationKind::Migrate);
    reserve(&conn, "app", "20220101", MigrationKind::Migrate);
    reserve(&conn, "other", "1.0.0", MigrationKind::Migrate);

    let all = find_history(&conn, &MigrationHistoryFind::default()).unwrap();
    let order: Vec<i64> = all.iter().map(|h| h.id).collect();
    assert_eq!(order, vec![3, 2, 1]);

    let app = find_history(
        &conn,
        &MigrationHistoryFind {
            namespace: Some(ns("app")),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(app.len(), 2);

    let legacy = find_history(
        &conn,
        &MigrationHistoryFind {
            version: Some("20220101".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(legacy.len(), 1);
    assert_eq!(legacy[0].version, "20220101");
    assert!(!legacy[0].use_semantic_version);

    let semantic = find_history(
        &conn,
        &MigrationHistoryFind {
            version: Some("1.0.0".to_string()),
            limit: Some(1),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(semantic.len(), 1);
    assert_eq!(semantic[0].namespace, "other");
    assert!(semantic[0].use_semantic_version);

    let pending = find_history(
        &conn,
        &MigrationHistoryFind {
            status: Some(MigrationStatus::Pending),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(pending.len(), 3);
}

#[test]
fn test_find_history_honors_version_format() {
    let conn = ledger();
    let mut info = MigrationInfo::new(ns("app"), "1.0.0", MigrationKind::Migrate);
    info.use_semantic_version = false;
    let stored = to_stored_version(false, &info.version, "").unwrap();
    insert_pending(&conn, 0, "", &info, &stored, "SELECT 1", 3).unwrap();

    let find = |use_semantic_version| {
        find_history(
            &conn,
            &MigrationHistoryFind {
                version: Some("1.0.0".to_string()),
                use_semantic_version,
                ..Default::default()
            },
        )
        .unwrap()
    };
    assert_eq!(find(Some(false)).len(), 1);
    assert!(!find(Some(false))[0].use_semantic_version);
    assert!(find(Some(true)).is_empty());
    // guessed as semantic from its shape
    assert!(find(None).is_empty());
}

#[test]
fn test_legacy_row_is_typed_error() {
    let conn = ledger();
    insert_raw(&conn, "app", 1, "20220101");

    let err = find_history(&conn, &MigrationHistoryFind::default()).unwrap_err();
    assert!(matches!(err, DbError::InvalidStoredVersion { id: 1, .. }));
    let err = largest_version_since_baseline(&conn, &ns("app")).unwrap_err();
    assert!(matches!(err, DbError::InvalidStoredVersion { .. }));
}

#[test]
fn test_compaction_is_reentrant() {
    let conn = ledger();
    insert_raw(&conn, "app", 1, "20220101");
    insert_raw(&conn, "other", 1, "20220102");

    assert_eq!(compact_legacy_versions(&conn, Some(&ns("app"))).unwrap(), 1);
    assert_eq!(compact_legacy_versions(&conn, Some(&ns("app"))).unwrap(), 0);
    assert_eq!(compact_legacy_versions(&conn, None).unwrap(), 1);
    assert_eq!(compact_legacy_versions(&conn, None).unwrap(), 0);

    let history = find_history(&conn, &MigrationHistoryFind::default()).unwrap();
    assert!(history.iter().all(|h| !h.use_semantic_version));
}

#[test]
fn test_with_compaction_retries_once() {
    let conn = ledger();
    insert_raw(&conn, "app", 1, "20220101");

    let largest = with_compaction(&conn, Some(&ns("app")), |conn| {
        largest_version_since_baseline(conn, &ns("app"))
    })
    .unwrap();
    assert_eq!(largest, Some(format!("{NON_SEMANTIC_PREFIX}20220101")));

    let history = with_compaction(&conn, None, |conn| {
        find_history(conn, &MigrationHistoryFind::default())
    })
    .unwrap();
    assert_eq!(history[0].version, "20220101");
}

#[test]
fn test_legacy_sorts_before_semantic() {
    let conn = ledger();
    insert_raw(&conn, "app", 1, "20220101");
    compact_legacy_versions(&conn, None).unwrap();
    reserve(&conn, "app", "0.1.0", MigrationKind::Migrate);

    assert_eq!(
        largest_version_since_baseline(&conn, &ns("app")).unwrap(),
        Some("0000.0001.0000-".to_string())
    );
}
