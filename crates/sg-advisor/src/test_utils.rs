//! Shared test utilities for sg-advisor

use crate::context::AdvisorContext;
use crate::registry::Registry;
use sg_core::{Advice, Catalog, CatalogError, Engine, Index, Namespace, PolicyRule};

/// Table that owns every index in [`MockCatalog`].
pub const MOCK_TABLE: &str = "tech_book";

/// Catalog with a fixed set of indexes on `tech_book`, visible from any
/// namespace: `old_index (id, name)`, `old_uk (id, name)` unique, and
/// `PRIMARY (id)`.
#[derive(Debug, Clone, Default)]
pub struct MockCatalog {
    failing: bool,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog whose every lookup fails with an internal error.
    pub fn failing() -> Self {
        Self { failing: true }
    }
}

impl Catalog for MockCatalog {
    fn find_index(&self, namespace: &Namespace, index_name: &str) -> Result<Index, CatalogError> {
        if self.failing {
            return Err(CatalogError::Internal("catalog unavailable".to_string()));
        }
        let (unique, primary) = match index_name {
            "old_index" => (false, false),
            "old_uk" => (true, false),
            "PRIMARY" => (true, true),
            _ => {
                return Err(CatalogError::IndexNotFound {
                    namespace: namespace.to_string(),
                    name: index_name.to_string(),
                })
            }
        };
        let columns = if primary {
            vec!["id".to_string()]
        } else {
            vec!["id".to_string(), "name".to_string()]
        };
        Ok(Index {
            name: index_name.to_string(),
            table: MOCK_TABLE.to_string(),
            unique,
            primary,
            columns,
        })
    }
}

pub fn test_namespace() -> Namespace {
    Namespace::parse("test_db").unwrap()
}

/// Context over `catalog` for the test namespace.
pub fn make_ctx(catalog: &dyn Catalog) -> AdvisorContext<'_> {
    AdvisorContext::new(test_namespace(), catalog)
}

/// Run a single configured rule through the default registry.
pub fn check_rule(engine: Engine, rule: &PolicyRule, sql: &str) -> Vec<Advice> {
    let registry = Registry::with_defaults().unwrap();
    let catalog = MockCatalog::new();
    let ctx = make_ctx(&catalog).for_rule(rule);
    registry.check(engine, rule.kind, &ctx, sql).unwrap()
}
