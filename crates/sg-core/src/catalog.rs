//! Read-only schema metadata lookup used by semantic rules.

use crate::namespace::Namespace;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// An index as seen by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub table: String,
    pub unique: bool,
    pub primary: bool,
    /// Column expressions in index order.
    pub columns: Vec<String>,
}

/// Catalog lookup errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// C001: Index absent from the catalog
    #[error("[C001] Index '{name}' not found in {namespace}")]
    IndexNotFound { namespace: String, name: String },

    /// C002: Backing store failure
    #[error("[C002] Catalog lookup failed: {0}")]
    Internal(String),
}

/// Schema metadata lookup. Calls may block; implementations must be
/// shareable across concurrent checks.
pub trait Catalog: Send + Sync {
    fn find_index(&self, namespace: &Namespace, index_name: &str) -> Result<Index, CatalogError>;
}

/// An in-memory catalog snapshot keyed by namespace and index name.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCatalog {
    indexes: HashMap<(String, String), Index>,
}

impl SnapshotCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, namespace: &Namespace, index: Index) {
        self.indexes
            .insert((namespace.to_string(), index.name.clone()), index);
    }

    pub fn with_index(mut self, namespace: &Namespace, index: Index) -> Self {
        self.insert(namespace, index);
        self
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

impl Catalog for SnapshotCatalog {
    fn find_index(&self, namespace: &Namespace, index_name: &str) -> Result<Index, CatalogError> {
        self.indexes
            .get(&(namespace.to_string(), index_name.to_string()))
            .cloned()
            .ok_or_else(|| CatalogError::IndexNotFound {
                namespace: namespace.to_string(),
                name: index_name.to_string(),
            })
    }
}
