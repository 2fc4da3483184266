//! Ledger primitives over a single SQLite connection.
//!
//! Everything here is synchronous; [`crate::sqlite::SqliteDriver`] runs it
//! on the blocking pool while holding the connection lock.

use crate::error::{is_unique_violation, query_error, DbError, DbResult};
use crate::traits::Reservation;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use sg_core::{
    from_stored_version, is_semantic, to_stored_version, MigrationHistory, MigrationHistoryFind,
    MigrationInfo, MigrationStatus, Namespace, NON_SEMANTIC_PREFIX,
};
use std::time::Duration;

const HISTORY_COLUMNS: &str = "id, created_by, created_ts, updated_by, updated_ts, \
    release_version, namespace, sequence, source, type, status, version, description, \
    statement, schema, schema_prev, execution_duration_ns, issue_id, payload";

const INSERT_PENDING: &str = "INSERT INTO sg_migration_history (
        created_by, created_ts, updated_by, updated_ts, release_version, namespace,
        sequence, source, type, status, version, description, statement, schema,
        schema_prev, execution_duration_ns, issue_id, payload
    ) VALUES (?1, ?2, ?1, ?2, ?3, ?4, ?5, ?6, ?7, 'PENDING', ?8, ?9, ?10, ?11, ?11, 0, ?12, ?13)";

/// Largest sequence in `namespace`, 0 for an empty history.
pub(crate) fn largest_sequence(
    conn: &Connection,
    namespace: &Namespace,
    baseline_only: bool,
) -> DbResult<i64> {
    let sql = if baseline_only {
        "SELECT MAX(sequence) FROM sg_migration_history \
         WHERE namespace = ?1 AND type IN ('BASELINE', 'BRANCH')"
    } else {
        "SELECT MAX(sequence) FROM sg_migration_history WHERE namespace = ?1"
    };
    let largest: Option<i64> = conn
        .query_row(sql, params![namespace.as_str()], |row| row.get(0))
        .map_err(query_error(sql))?;
    Ok(largest.unwrap_or(0))
}

/// Largest stored version among records at or after the latest baseline.
///
/// Every candidate row must decode; an undecodable one fails with
/// [`DbError::InvalidStoredVersion`].
pub(crate) fn largest_version_since_baseline(
    conn: &Connection,
    namespace: &Namespace,
) -> DbResult<Option<String>> {
    let baseline = largest_sequence(conn, namespace, true)?;
    const SQL: &str =
        "SELECT id, version FROM sg_migration_history WHERE namespace = ?1 AND sequence >= ?2";
    let mut stmt = conn.prepare(SQL).map_err(query_error(SQL))?;
    let rows = stmt
        .query_map(params![namespace.as_str(), baseline], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(query_error(SQL))?;

    let mut largest: Option<String> = None;
    for row in rows {
        let (id, version) = row.map_err(query_error(SQL))?;
        if from_stored_version(&version).is_err() {
            return Err(DbError::InvalidStoredVersion { id, version });
        }
        if largest.as_deref().map_or(true, |current| version.as_str() > current) {
            largest = Some(version);
        }
    }
    Ok(largest)
}

/// Write a Pending record at `prior_sequence + 1`.
///
/// When the unique index on (namespace, sequence) reports that another
/// writer took the slot, the next free sequence is re-read and the insert
/// retried, at most `attempts` times in total.
pub(crate) fn insert_pending(
    conn: &Connection,
    prior_sequence: i64,
    schema_prev: &str,
    info: &MigrationInfo,
    stored_version: &str,
    statement: &str,
    attempts: u32,
) -> DbResult<Reservation> {
    let attempts = attempts.max(1);
    let mut sequence = prior_sequence + 1;
    for attempt in 1..=attempts {
        let result = conn.execute(
            INSERT_PENDING,
            params![
                info.creator,
                chrono::Utc::now().timestamp(),
                info.release_version,
                info.namespace.as_str(),
                sequence,
                info.source.as_str(),
                info.kind.as_str(),
                stored_version,
                info.description,
                statement,
                schema_prev,
                info.issue_id,
                info.payload,
            ],
        );
        match result {
            Ok(_) => {
                let id = conn.last_insert_rowid();
                log::debug!(
                    "Reserved sequence {} in {} for version {} (history {})",
                    sequence,
                    info.namespace,
                    info.version,
                    id
                );
                return Ok(Reservation { id, sequence });
            }
            Err(e) if is_unique_violation(&e) => {
                if attempt == attempts {
                    break;
                }
                let next = largest_sequence(conn, &info.namespace, false)? + 1;
                log::debug!(
                    "Sequence {} in {} already taken, retrying with {} ({}/{})",
                    sequence,
                    info.namespace,
                    next,
                    attempt,
                    attempts
                );
                sequence = next;
            }
            Err(e) => return Err(DbError::query(e, INSERT_PENDING)),
        }
    }
    Err(DbError::SequenceConflict {
        namespace: info.namespace.clone(),
        sequence,
        attempts,
    })
}

/// Move a Pending record to DONE or FAILED.
///
/// `schema` is only written for DONE. Records that already left Pending
/// are never touched again.
pub(crate) fn finalize(
    conn: &Connection,
    id: i64,
    status: MigrationStatus,
    duration: Duration,
    schema: Option<&str>,
) -> DbResult<()> {
    let duration_ns = i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX);
    let now = chrono::Utc::now().timestamp();
    let changed = match schema {
        Some(schema) => {
            const SQL: &str = "UPDATE sg_migration_history \
                SET status = ?1, execution_duration_ns = ?2, schema = ?3, updated_ts = ?4 \
                WHERE id = ?5 AND status = 'PENDING'";
            conn.execute(SQL, params![status.as_str(), duration_ns, schema, now, id])
                .map_err(query_error(SQL))?
        }
        None => {
            const SQL: &str = "UPDATE sg_migration_history \
                SET status = ?1, execution_duration_ns = ?2, updated_ts = ?3 \
                WHERE id = ?4 AND status = 'PENDING'";
            conn.execute(SQL, params![status.as_str(), duration_ns, now, id])
                .map_err(query_error(SQL))?
        }
    };
    if changed == 1 {
        log::debug!("Migration history {} marked {}", id, status);
        return Ok(());
    }

    const STATUS: &str = "SELECT status FROM sg_migration_history WHERE id = ?1";
    let current: Option<String> = conn
        .query_row(STATUS, params![id], |row| row.get(0))
        .optional()
        .map_err(query_error(STATUS))?;
    match current {
        None => Err(DbError::HistoryNotFound { id }),
        Some(status) => Err(DbError::NotPending {
            id,
            status: status.parse()?,
        }),
    }
}

/// History rows matching `find`, newest first.
pub(crate) fn find_history(
    conn: &Connection,
    find: &MigrationHistoryFind,
) -> DbResult<Vec<MigrationHistory>> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    if let Some(id) = find.id {
        clauses.push("id = ?");
        values.push(Value::Integer(id));
    }
    if let Some(namespace) = &find.namespace {
        clauses.push("namespace = ?");
        values.push(Value::Text(namespace.to_string()));
    }
    if let Some(version) = &find.version {
        // Semantic versions carry a free-form suffix after the padded part.
        if find
            .use_semantic_version
            .unwrap_or_else(|| is_semantic(version))
        {
            clauses.push("version LIKE ?");
            values.push(Value::Text(format!(
                "{}%",
                to_stored_version(true, version, "")?
            )));
        } else {
            clauses.push("version = ?");
            values.push(Value::Text(to_stored_version(false, version, "")?));
        }
    }
    if let Some(source) = find.source {
        clauses.push("source = ?");
        values.push(Value::Text(source.as_str().to_string()));
    }
    if let Some(status) = find.status {
        clauses.push("status = ?");
        values.push(Value::Text(status.as_str().to_string()));
    }

    let mut sql = format!("SELECT {HISTORY_COLUMNS} FROM sg_migration_history");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY created_ts DESC, id DESC");
    if let Some(limit) = find.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    let mut stmt = conn.prepare(&sql).map_err(query_error(&sql))?;
    let rows = stmt
        .query_map(params_from_iter(values.iter()), HistoryRow::from_row)
        .map_err(query_error(&sql))?;
    let mut history = Vec::new();
    for row in rows {
        history.push(row.map_err(query_error(&sql))?.into_history()?);
    }
    Ok(history)
}

/// Rewrite legacy rows, stored before the non-semantic prefix existed, into
/// the prefixed form. Returns the number of rows rewritten.
///
/// Safe to run repeatedly: prefixed rows always decode and are left alone,
/// and each update is conditional on the row still holding the old value.
pub(crate) fn compact_legacy_versions(
    conn: &Connection,
    namespace: Option<&Namespace>,
) -> DbResult<usize> {
    let (sql, values) = match namespace {
        Some(ns) => (
            "SELECT id, version FROM sg_migration_history WHERE namespace = ?",
            vec![Value::Text(ns.to_string())],
        ),
        None => ("SELECT id, version FROM sg_migration_history", Vec::new()),
    };
    let legacy: Vec<(i64, String)> = {
        let mut stmt = conn.prepare(sql).map_err(query_error(sql))?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(query_error(sql))?;
        let mut legacy = Vec::new();
        for row in rows {
            let (id, version) = row.map_err(query_error(sql))?;
            if from_stored_version(&version).is_err() {
                legacy.push((id, version));
            }
        }
        legacy
    };

    const UPDATE: &str =
        "UPDATE sg_migration_history SET version = ?1 WHERE id = ?2 AND version = ?3";
    let mut rewritten = 0;
    for (id, version) in &legacy {
        rewritten += conn
            .execute(
                UPDATE,
                params![format!("{NON_SEMANTIC_PREFIX}{version}"), id, version],
            )
            .map_err(query_error(UPDATE))?;
    }
    if rewritten > 0 {
        log::info!(
            "Compacted {} legacy migration version(s){}",
            rewritten,
            namespace.map(|ns| format!(" in {ns}")).unwrap_or_default()
        );
    }
    Ok(rewritten)
}

/// Run `f`; if it trips over a legacy stored version, compact once and run
/// it again.
pub(crate) fn with_compaction<T>(
    conn: &Connection,
    namespace: Option<&Namespace>,
    f: impl Fn(&Connection) -> DbResult<T>,
) -> DbResult<T> {
    match f(conn) {
        Err(DbError::InvalidStoredVersion { id, version }) => {
            log::info!(
                "Migration history {} has legacy version {:?}, compacting",
                id,
                version
            );
            compact_legacy_versions(conn, namespace)?;
            f(conn)
        }
        other => other,
    }
}

/// One ledger row as stored.
struct HistoryRow {
    id: i64,
    created_by: String,
    created_ts: i64,
    updated_by: String,
    updated_ts: i64,
    release_version: String,
    namespace: String,
    sequence: i64,
    source: String,
    kind: String,
    status: String,
    version: String,
    description: String,
    statement: String,
    schema: String,
    schema_prev: String,
    execution_duration_ns: i64,
    issue_id: String,
    payload: String,
}

impl HistoryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            created_by: row.get(1)?,
            created_ts: row.get(2)?,
            updated_by: row.get(3)?,
            updated_ts: row.get(4)?,
            release_version: row.get(5)?,
            namespace: row.get(6)?,
            sequence: row.get(7)?,
            source: row.get(8)?,
            kind: row.get(9)?,
            status: row.get(10)?,
            version: row.get(11)?,
            description: row.get(12)?,
            statement: row.get(13)?,
            schema: row.get(14)?,
            schema_prev: row.get(15)?,
            execution_duration_ns: row.get(16)?,
            issue_id: row.get(17)?,
            payload: row.get(18)?,
        })
    }

    fn into_history(self) -> DbResult<MigrationHistory> {
        let decoded =
            from_stored_version(&self.version).map_err(|_| DbError::InvalidStoredVersion {
                id: self.id,
                version: self.version.clone(),
            })?;
        Ok(MigrationHistory {
            id: self.id,
            created_by: self.created_by,
            created_ts: self.created_ts,
            updated_by: self.updated_by,
            updated_ts: self.updated_ts,
            release_version: self.release_version,
            namespace: Namespace::parse(self.namespace)?,
            sequence: self.sequence,
            source: self.source.parse()?,
            kind: self.kind.parse()?,
            status: self.status.parse()?,
            version: decoded.version,
            use_semantic_version: decoded.use_semantic_version,
            semantic_version_suffix: decoded.suffix,
            description: self.description,
            statement: self.statement,
            schema: self.schema,
            schema_prev: self.schema_prev,
            execution_duration_ns: self.execution_duration_ns,
            issue_id: self.issue_id,
            payload: self.payload,
        })
    }
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
