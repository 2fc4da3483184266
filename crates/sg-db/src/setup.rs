//! Ledger schema setup.
//!
//! Tracks applied ledger DDL versions in `sg_schema_version` and runs any
//! unapplied ones. Each DDL batch runs without an enclosing transaction.

use crate::ddl::{latest_version, MIGRATIONS};
use crate::error::{query_error, DbResult};
use crate::HISTORY_TABLE;
use rusqlite::{params, Connection};

const VERSION_TABLE_DDL: &str = "CREATE TABLE IF NOT EXISTS sg_schema_version (
    version    INTEGER NOT NULL,
    applied_at INTEGER NOT NULL
)";

/// Ensure the `sg_schema_version` table exists.
fn ensure_version_table(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(VERSION_TABLE_DDL)
        .map_err(query_error(VERSION_TABLE_DDL))
}

fn table_exists(conn: &Connection, name: &str) -> DbResult<bool> {
    const SQL: &str = "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1";
    let count: i64 = conn
        .query_row(SQL, params![name], |row| row.get(0))
        .map_err(query_error(SQL))?;
    Ok(count > 0)
}

/// Return the highest applied ledger version, or 0 if none.
fn current_version(conn: &Connection) -> DbResult<i32> {
    if !table_exists(conn, "sg_schema_version")? {
        return Ok(0);
    }
    const SQL: &str = "SELECT COALESCE(MAX(version), 0) FROM sg_schema_version";
    conn.query_row(SQL, [], |row| row.get(0))
        .map_err(query_error(SQL))
}

/// Whether the ledger is missing or older than this build.
pub(crate) fn needs_setup(conn: &Connection) -> DbResult<bool> {
    Ok(!table_exists(conn, HISTORY_TABLE)? || current_version(conn)? < latest_version())
}

/// Run all unapplied ledger migrations against `conn`.
pub(crate) fn run_migrations(conn: &Connection) -> DbResult<()> {
    ensure_version_table(conn)?;
    let current = current_version(conn)?;

    for migration in MIGRATIONS {
        if migration.version <= current {
            continue;
        }
        log::debug!("Applying ledger migration v{:03}", migration.version);

        conn.execute_batch(migration.sql)
            .map_err(query_error(migration.sql))?;

        const RECORD: &str =
            "INSERT INTO sg_schema_version (version, applied_at) VALUES (?1, ?2)";
        conn.execute(
            RECORD,
            params![migration.version, chrono::Utc::now().timestamp()],
        )
        .map_err(query_error(RECORD))?;
    }
    Ok(())
}
