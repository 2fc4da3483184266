//! Per-invocation inputs handed to every rule

use crate::error::{AdvisorError, AdvisorResult};
use serde::de::DeserializeOwned;
use sg_core::{Advice, AdviceCode, AdviceStatus, Catalog, Namespace, PolicyRule, RuleKind, RuleLevel};

/// What a rule sees besides the statements: the target namespace, the
/// session charset and collation, the configured level and payload of
/// the rule being run, and a read-only catalog.
#[derive(Clone)]
pub struct AdvisorContext<'a> {
    pub namespace: Namespace,
    pub charset: Option<String>,
    pub collation: Option<String>,
    pub level: RuleLevel,
    pub payload: serde_json::Value,
    pub catalog: &'a dyn Catalog,
}

impl<'a> AdvisorContext<'a> {
    /// A context at level `ERROR` with no payload.
    pub fn new(namespace: Namespace, catalog: &'a dyn Catalog) -> Self {
        Self {
            namespace,
            charset: None,
            collation: None,
            level: RuleLevel::Error,
            payload: serde_json::Value::Null,
            catalog,
        }
    }

    pub fn with_charset(mut self, charset: Option<String>) -> Self {
        self.charset = charset;
        self
    }

    pub fn with_collation(mut self, collation: Option<String>) -> Self {
        self.collation = collation;
        self
    }

    pub fn with_level(mut self, level: RuleLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Copy of this context carrying `rule`'s level and payload.
    pub fn for_rule(&self, rule: &PolicyRule) -> Self {
        self.clone()
            .with_level(rule.level)
            .with_payload(rule.payload.clone())
    }

    /// Status every finding of the current rule gets.
    pub fn status(&self) -> AdviceStatus {
        self.level.advice_status()
    }

    /// A finding for `kind` at the configured level.
    pub fn advice(&self, kind: RuleKind, code: AdviceCode, content: impl Into<String>) -> Advice {
        Advice::new(self.status(), code, kind.as_str(), content)
    }

    /// Decode the rule payload into `T`.
    pub fn decode_payload<T: DeserializeOwned>(&self, kind: RuleKind) -> AdvisorResult<T> {
        serde_json::from_value(self.payload.clone()).map_err(|e| AdvisorError::InvalidPayload {
            kind,
            message: e.to_string(),
        })
    }
}
