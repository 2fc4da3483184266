//! sg-core - Core library for schemagate
//!
//! This crate provides the types shared by the advisor and the migration
//! ledger: engines, namespaces, advice, review policies, migration records,
//! the stored-version codec, the catalog interface, and configuration.

pub mod advice;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod migration;
pub mod namespace;
mod newtype_string;
pub mod plan;
pub mod policy;
pub mod version;

pub use advice::{Advice, AdviceCode, AdviceStatus, SYNTAX_ERROR_TITLE};
pub use catalog::{Catalog, CatalogError, Index, SnapshotCatalog};
pub use config::{Config, DatabaseConfig, MigrationConfig};
pub use engine::Engine;
pub use error::{CoreError, CoreResult};
pub use migration::{
    MigrationHistory, MigrationHistoryFind, MigrationInfo, MigrationKind, MigrationSource,
    MigrationStatus,
};
pub use namespace::Namespace;
pub use plan::{Feature, Plan};
pub use policy::{
    NamingPayload, Policy, PolicyRule, RequiredColumnPayload, RowStatus, RuleKind, RuleLevel,
};
pub use version::{
    from_stored_version, is_semantic, to_stored_version, StoredVersion, NON_SEMANTIC_PREFIX,
};
