//! Error types for sg-db

use rusqlite::ErrorCode;
use sg_core::{CoreError, MigrationStatus, Namespace};
use thiserror::Error;

/// Driver and ledger errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {message}\n  query: {sql}")]
    Query { message: String, sql: String },

    /// Driver used after close (D003)
    #[error("[D003] Database connection is closed")]
    NotConnected,

    /// Ledger record missing (D004)
    #[error("[D004] Migration history {id} not found")]
    HistoryNotFound { id: i64 },

    /// Ledger row with an undecodable version (D005)
    #[error("[D005] Migration history {id} has invalid stored version {version:?}")]
    InvalidStoredVersion { id: i64, version: String },

    /// Mutex poisoned (D006)
    #[error("[D006] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// Sequence reservation lost every retry (D007)
    #[error("[D007] Could not reserve a sequence in {namespace} after {attempts} attempt(s), last tried {sequence}")]
    SequenceConflict {
        namespace: Namespace,
        sequence: i64,
        attempts: u32,
    },

    /// Finalizing a record that already left Pending (D008)
    #[error("[D008] Migration history {id} is {status}, expected PENDING")]
    NotPending { id: i64, status: MigrationStatus },

    /// Statement aborted through the interrupt handle (D009)
    #[error("[D009] SQL execution interrupted\n  query: {sql}")]
    Interrupted { sql: String },

    /// Core type error (D010)
    #[error("[D010] {0}")]
    Core(#[from] CoreError),

    /// Internal error (D011)
    #[error("[D011] Internal database error: {0}")]
    Internal(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Wrap a SQLite error together with the query that produced it.
    pub(crate) fn query(err: rusqlite::Error, sql: &str) -> Self {
        if err.sqlite_error_code() == Some(ErrorCode::OperationInterrupted) {
            return DbError::Interrupted {
                sql: sql.to_string(),
            };
        }
        DbError::Query {
            message: err.to_string(),
            sql: sql.to_string(),
        }
    }
}

/// `map_err` adapter attaching `sql` to a SQLite error.
pub(crate) fn query_error(sql: &str) -> impl FnOnce(rusqlite::Error) -> DbError + '_ {
    move |err| DbError::query(err, sql)
}

/// Whether `err` is a uniqueness violation.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Migration executor errors
#[derive(Error, Debug)]
pub enum MigrationError {
    /// MG001: A previous migration in the namespace has not finished
    #[error("[MG001] Namespace {namespace} is busy: migration history {id} is still PENDING")]
    NamespaceBusy { namespace: Namespace, id: i64 },

    /// MG002: Requested version violates forward-only ordering
    #[error("[MG002] Version conflict in {namespace} for version {version}: {reason}")]
    VersionConflict {
        namespace: Namespace,
        version: String,
        reason: String,
    },

    /// MG003: Reservation lock not acquired in time
    #[error("[MG003] Timed out after {waited_ms}ms waiting for the migration lock of {namespace}")]
    LockTimeout { namespace: Namespace, waited_ms: u64 },

    /// MG004: The migration statement failed; the record is FAILED
    #[error("[MG004] Migration {id} in {namespace} failed: {source}")]
    ExecutionFailed {
        namespace: Namespace,
        id: i64,
        #[source]
        source: DbError,
    },

    /// MG005: The migration statement exceeded its time budget
    #[error("[MG005] Migration {id} in {namespace} timed out after {timeout_ms}ms")]
    ExecutionTimeout {
        namespace: Namespace,
        id: i64,
        timeout_ms: u64,
    },

    /// MG006: Ledger or driver error
    #[error("{0}")]
    Db(#[from] DbError),

    /// MG007: Invalid migration input
    #[error("{0}")]
    Core(#[from] CoreError),
}

/// Result type alias for MigrationError
pub type MigrationResult<T> = Result<T, MigrationError>;
