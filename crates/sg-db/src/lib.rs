//! sg-db - Database layer for schemagate
//!
//! This crate provides the `Driver` trait, a SQLite implementation, the
//! migration ledger kept inside the target database, and the
//! `MigrationExecutor` that sequences and runs schema changes.

pub(crate) mod ddl;
pub mod error;
pub mod executor;
pub(crate) mod ledger;
pub(crate) mod setup;
pub mod sqlite;
pub mod traits;

pub use error::{DbError, DbResult, MigrationError, MigrationResult};
pub use executor::{MigrationExecutor, MigrationOutcome, NamespaceLocks};
pub use sqlite::SqliteDriver;
pub use traits::{Driver, QueryResult, Reservation};

/// Name of the ledger table created in every target database.
pub const HISTORY_TABLE: &str = "sg_migration_history";
