//! SQLite driver

use crate::error::{query_error, DbError, DbResult};
use crate::ledger;
use crate::setup;
use crate::traits::{Driver, QueryResult, Reservation};
use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, InterruptHandle};
use sg_core::{
    Engine, Index, MigrationHistory, MigrationHistoryFind, MigrationInfo, MigrationStatus,
    Namespace, SnapshotCatalog,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const MEMORY_PATH: &str = ":memory:";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_RESERVE_RETRIES: u32 = 3;

struct Shared {
    conn: Mutex<Option<Connection>>,
    interrupt: Mutex<Option<InterruptHandle>>,
}

/// SQLite target driver.
///
/// One connection behind a mutex; every call runs on the blocking pool.
/// Closing and reopening an in-memory database yields a fresh, empty one.
pub struct SqliteDriver {
    path: String,
    shared: Arc<Shared>,
    reserve_retries: u32,
}

impl SqliteDriver {
    /// Create a new in-memory SQLite database
    pub fn in_memory() -> DbResult<Self> {
        Self::new(MEMORY_PATH)
    }

    /// Connect to `path` (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        let conn = connect(path)?;
        let shared = Shared {
            interrupt: Mutex::new(Some(conn.get_interrupt_handle())),
            conn: Mutex::new(Some(conn)),
        };
        Ok(Self {
            path: path.to_string(),
            shared: Arc::new(shared),
            reserve_retries: DEFAULT_RESERVE_RETRIES,
        })
    }

    /// Attempts made to reserve a sequence before giving up
    pub fn with_reserve_retries(mut self, retries: u32) -> Self {
        self.reserve_retries = retries.max(1);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Run `f` against the open connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        tokio::task::spawn_blocking(move || {
            let guard = shared
                .conn
                .lock()
                .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
            let conn = guard.as_ref().ok_or(DbError::NotConnected)?;
            f(conn)
        })
        .await
        .map_err(|e| DbError::Internal(format!("blocking task failed: {e}")))?
    }

    /// Rewrite legacy unprefixed versions, in one namespace or everywhere.
    pub async fn compact_legacy_versions(&self, namespace: Option<&Namespace>) -> DbResult<usize> {
        let namespace = namespace.cloned();
        self.with_conn(move |conn| ledger::compact_legacy_versions(conn, namespace.as_ref()))
            .await
    }

    /// Snapshot of every user index, keyed under `namespace`.
    pub async fn catalog_snapshot(&self, namespace: &Namespace) -> DbResult<SnapshotCatalog> {
        let namespace = namespace.clone();
        self.with_conn(move |conn| {
            let mut catalog = SnapshotCatalog::new();
            for index in list_indexes(conn)? {
                catalog.insert(&namespace, index);
            }
            log::debug!("Loaded {} index(es) for {}", catalog.len(), namespace);
            Ok(catalog)
        })
        .await
    }
}

fn connect(path: &str) -> DbResult<Connection> {
    let conn = if path == MEMORY_PATH {
        Connection::open_in_memory()
    } else {
        Connection::open(path)
    }
    .map_err(|e| DbError::ConnectionError(format!("{path}: {e}")))?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .map_err(|e| DbError::ConnectionError(e.to_string()))?;
    Ok(conn)
}

const LEDGER_TABLES: &str = "('sg_migration_history', 'sg_schema_version')";

fn dump_schema_sync(conn: &Connection) -> DbResult<String> {
    let sql = format!(
        "SELECT sql FROM sqlite_master \
         WHERE sql IS NOT NULL AND tbl_name NOT IN {LEDGER_TABLES} AND name NOT LIKE 'sqlite_%' \
         ORDER BY CASE type WHEN 'table' THEN 0 WHEN 'view' THEN 1 WHEN 'index' THEN 2 ELSE 3 END, name"
    );
    let mut stmt = conn.prepare(&sql).map_err(query_error(&sql))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(query_error(&sql))?;
    let mut schema = String::new();
    for ddl in rows {
        schema.push_str(&ddl.map_err(query_error(&sql))?);
        schema.push_str(";\n");
    }
    Ok(schema)
}

fn list_indexes(conn: &Connection) -> DbResult<Vec<Index>> {
    let sql = format!(
        "SELECT m.name, il.name, il.\"unique\", il.origin \
         FROM sqlite_master AS m JOIN pragma_index_list(m.name) AS il \
         WHERE m.type = 'table' AND m.name NOT IN {LEDGER_TABLES} \
         ORDER BY m.name, il.name"
    );
    let mut stmt = conn.prepare(&sql).map_err(query_error(&sql))?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, bool>(2)?,
                row.get::<_, String>(3)?,
            ))
        })
        .map_err(query_error(&sql))?;

    const COLUMNS: &str = "SELECT name FROM pragma_index_info(?1) ORDER BY seqno";
    let mut columns_stmt = conn.prepare(COLUMNS).map_err(query_error(COLUMNS))?;
    let mut indexes = Vec::new();
    for row in rows {
        let (table, name, unique, origin) = row.map_err(query_error(&sql))?;
        let columns = columns_stmt
            .query_map(params![name], |row| row.get::<_, Option<String>>(0))
            .map_err(query_error(COLUMNS))?
            .filter_map(|column| column.transpose())
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_error(COLUMNS))?;
        indexes.push(Index {
            name,
            table,
            unique,
            primary: origin == "pk",
            columns,
        });
    }
    Ok(indexes)
}

fn to_json(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => i.into(),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(text) => String::from_utf8_lossy(text).into_owned().into(),
        ValueRef::Blob(blob) => format!("<{} bytes>", blob.len()).into(),
    }
}

fn query_sync(conn: &Connection, sql: &str, limit: usize) -> DbResult<QueryResult> {
    let mut stmt = conn.prepare(sql).map_err(query_error(sql))?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query([]).map_err(query_error(sql))?;
    let mut result = QueryResult {
        columns,
        rows: Vec::new(),
    };
    while result.rows.len() < limit {
        let Some(row) = rows.next().map_err(query_error(sql))? else {
            break;
        };
        let mut values = Vec::with_capacity(result.columns.len());
        for i in 0..result.columns.len() {
            values.push(to_json(row.get_ref(i).map_err(query_error(sql))?));
        }
        result.rows.push(values);
    }
    Ok(result)
}

#[async_trait]
impl Driver for SqliteDriver {
    fn engine(&self) -> Engine {
        Engine::Sqlite
    }

    async fn open(&self) -> DbResult<()> {
        let path = self.path.clone();
        let shared = Arc::clone(&self.shared);
        tokio::task::spawn_blocking(move || {
            let conn = connect(&path)?;
            let handle = conn.get_interrupt_handle();
            let mut guard = shared
                .conn
                .lock()
                .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
            *guard = Some(conn);
            *shared
                .interrupt
                .lock()
                .map_err(|e| DbError::MutexPoisoned(e.to_string()))? = Some(handle);
            log::debug!("Opened SQLite database {}", path);
            Ok(())
        })
        .await
        .map_err(|e| DbError::Internal(format!("blocking task failed: {e}")))?
    }

    async fn close(&self) -> DbResult<()> {
        let shared = Arc::clone(&self.shared);
        tokio::task::spawn_blocking(move || {
            shared
                .interrupt
                .lock()
                .map_err(|e| DbError::MutexPoisoned(e.to_string()))?
                .take();
            let conn = shared
                .conn
                .lock()
                .map_err(|e| DbError::MutexPoisoned(e.to_string()))?
                .take();
            if let Some(conn) = conn {
                conn.close()
                    .map_err(|(_, e)| DbError::ConnectionError(e.to_string()))?;
            }
            Ok(())
        })
        .await
        .map_err(|e| DbError::Internal(format!("blocking task failed: {e}")))?
    }

    async fn ping(&self) -> DbResult<()> {
        self.with_conn(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map_err(query_error("SELECT 1"))?;
            Ok(())
        })
        .await
    }

    async fn execute(&self, statement: &str) -> DbResult<()> {
        let statement = statement.to_string();
        self.with_conn(move |conn| {
            conn.execute_batch(&statement)
                .map_err(|e| DbError::query(e, &statement))
        })
        .await
    }

    async fn query(&self, statement: &str, limit: usize) -> DbResult<QueryResult> {
        let statement = statement.to_string();
        self.with_conn(move |conn| query_sync(conn, &statement, limit))
            .await
    }

    async fn version(&self) -> DbResult<String> {
        self.with_conn(|conn| {
            const SQL: &str = "SELECT sqlite_version()";
            conn.query_row(SQL, [], |row| row.get(0))
                .map_err(query_error(SQL))
        })
        .await
    }

    async fn dump_schema(&self) -> DbResult<String> {
        self.with_conn(dump_schema_sync).await
    }

    fn interrupt(&self) {
        match self.shared.interrupt.lock() {
            Ok(handle) => {
                if let Some(handle) = handle.as_ref() {
                    log::debug!("Interrupting statement on {}", self.path);
                    handle.interrupt();
                }
            }
            Err(e) => log::warn!("Cannot interrupt {}: {}", self.path, e),
        }
    }

    async fn needs_setup_migration(&self) -> DbResult<bool> {
        self.with_conn(setup::needs_setup).await
    }

    async fn setup_migration_if_needed(&self) -> DbResult<()> {
        self.with_conn(|conn| {
            if !setup::needs_setup(conn)? {
                return Ok(());
            }
            setup::run_migrations(conn)?;
            log::info!("Created migration history table");
            Ok(())
        })
        .await
    }

    async fn find_largest_sequence(
        &self,
        namespace: &Namespace,
        baseline_only: bool,
    ) -> DbResult<i64> {
        let namespace = namespace.clone();
        self.with_conn(move |conn| ledger::largest_sequence(conn, &namespace, baseline_only))
            .await
    }

    async fn find_largest_version_since_baseline(
        &self,
        namespace: &Namespace,
    ) -> DbResult<Option<String>> {
        let namespace = namespace.clone();
        self.with_conn(move |conn| {
            ledger::with_compaction(conn, Some(&namespace), |conn| {
                ledger::largest_version_since_baseline(conn, &namespace)
            })
        })
        .await
    }

    async fn insert_pending_history(
        &self,
        prior_sequence: i64,
        schema_prev: &str,
        info: &MigrationInfo,
        stored_version: &str,
        statement: &str,
    ) -> DbResult<Reservation> {
        let schema_prev = schema_prev.to_string();
        let info = info.clone();
        let stored_version = stored_version.to_string();
        let statement = statement.to_string();
        let attempts = self.reserve_retries;
        self.with_conn(move |conn| {
            ledger::insert_pending(
                conn,
                prior_sequence,
                &schema_prev,
                &info,
                &stored_version,
                &statement,
                attempts,
            )
        })
        .await
    }

    async fn update_history_as_done(
        &self,
        id: i64,
        duration: Duration,
        schema: &str,
    ) -> DbResult<()> {
        let schema = schema.to_string();
        self.with_conn(move |conn| {
            ledger::finalize(conn, id, MigrationStatus::Done, duration, Some(&schema))
        })
        .await
    }

    async fn update_history_as_failed(&self, id: i64, duration: Duration) -> DbResult<()> {
        self.with_conn(move |conn| {
            ledger::finalize(conn, id, MigrationStatus::Failed, duration, None)
        })
        .await
    }

    async fn find_migration_history_list(
        &self,
        find: &MigrationHistoryFind,
    ) -> DbResult<Vec<MigrationHistory>> {
        let find = find.clone();
        self.with_conn(move |conn| {
            ledger::with_compaction(conn, find.namespace.as_ref(), |conn| {
                ledger::find_history(conn, &find)
            })
        })
        .await
    }
}

#[cfg(test)]
#[path = "sqlite_test.rs"]
mod tests;
