//! Rule registry and single-rule dispatch
//!
//! The registry is assembled once through [`RegistryBuilder`] and is
//! read-only afterwards, so it can be shared freely between threads.

use crate::advisor::{Advisor, ParsedScript};
use crate::context::AdvisorContext;
use crate::error::{AdvisorError, AdvisorResult};
use crate::rules::column::{ColumnNoNullAdvisor, RequiredColumnAdvisor};
use crate::rules::compatibility::BackwardCompatibilityAdvisor;
use crate::rules::engine::UseInnoDbAdvisor;
use crate::rules::fake::FakeAdvisor;
use crate::rules::naming::{NamingColumnAdvisor, NamingTableAdvisor};
use crate::rules::naming_index::NamingIndexAdvisor;
use crate::rules::statement::{
    NoLeadingWildcardLikeAdvisor, NoSelectAllAdvisor, RequireWhereAdvisor,
};
use crate::rules::syntax::SyntaxAdvisor;
use crate::rules::table::RequirePrimaryKeyAdvisor;
use sg_core::{Advice, AdviceCode, AdviceStatus, Engine, RuleKind};
use std::collections::BTreeMap;
use std::sync::Arc;

type RuleKey = (Engine, RuleKind);

/// Collects rule registrations, rejecting duplicates.
#[derive(Default)]
pub struct RegistryBuilder {
    rules: BTreeMap<RuleKey, Arc<dyn Advisor>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `rule` for `engine` under the rule's own kind.
    pub fn register(&mut self, engine: Engine, rule: Arc<dyn Advisor>) -> AdvisorResult<()> {
        let key = (engine, rule.kind());
        if self.rules.contains_key(&key) {
            return Err(AdvisorError::DuplicateRule {
                engine,
                kind: key.1,
            });
        }
        self.rules.insert(key, rule);
        Ok(())
    }

    /// Register one shared rule instance for several engines.
    pub fn register_for(&mut self, engines: &[Engine], rule: Arc<dyn Advisor>) -> AdvisorResult<()> {
        for engine in engines {
            self.register(*engine, Arc::clone(&rule))?;
        }
        Ok(())
    }

    pub fn build(self) -> Registry {
        log::debug!("Rule registry built with {} entries", self.rules.len());
        Registry { rules: self.rules }
    }
}

/// Immutable (engine, kind) → rule table.
pub struct Registry {
    rules: BTreeMap<RuleKey, Arc<dyn Advisor>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registry with every built-in rule registered for the engines it
    /// supports.
    pub fn with_defaults() -> AdvisorResult<Self> {
        let all = &Engine::ALL;
        let mysql_family = &[Engine::MySql, Engine::TiDb];

        let mut builder = RegistryBuilder::new();
        builder.register_for(all, Arc::new(FakeAdvisor))?;
        builder.register_for(mysql_family, Arc::new(SyntaxAdvisor::mysql()))?;
        builder.register(Engine::Postgres, Arc::new(SyntaxAdvisor::postgres()))?;
        builder.register_for(mysql_family, Arc::new(UseInnoDbAdvisor))?;
        builder.register_for(all, Arc::new(NamingTableAdvisor))?;
        builder.register_for(all, Arc::new(NamingColumnAdvisor))?;
        builder.register_for(all, Arc::new(NamingIndexAdvisor::index()))?;
        builder.register_for(all, Arc::new(NamingIndexAdvisor::unique_key()))?;
        builder.register_for(all, Arc::new(NamingIndexAdvisor::foreign_key()))?;
        builder.register_for(all, Arc::new(NoSelectAllAdvisor))?;
        builder.register_for(all, Arc::new(RequireWhereAdvisor))?;
        builder.register_for(all, Arc::new(NoLeadingWildcardLikeAdvisor))?;
        builder.register_for(all, Arc::new(RequirePrimaryKeyAdvisor))?;
        builder.register_for(all, Arc::new(RequiredColumnAdvisor))?;
        builder.register_for(all, Arc::new(ColumnNoNullAdvisor))?;
        builder.register_for(all, Arc::new(BackwardCompatibilityAdvisor))?;
        Ok(builder.build())
    }

    pub fn get(&self, engine: Engine, kind: RuleKind) -> Option<&dyn Advisor> {
        self.rules.get(&(engine, kind)).map(|rule| rule.as_ref())
    }

    pub fn supports(&self, engine: Engine, kind: RuleKind) -> bool {
        self.rules.contains_key(&(engine, kind))
    }

    /// Registered (engine, kind) pairs in engine then kind order.
    pub fn entries(&self) -> impl Iterator<Item = (Engine, RuleKind)> + '_ {
        self.rules.keys().copied()
    }

    /// Kinds available for `engine`.
    pub fn kinds_for(&self, engine: Engine) -> Vec<RuleKind> {
        self.entries()
            .filter(|(e, _)| *e == engine)
            .map(|(_, kind)| kind)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check `sql` against one rule.
    ///
    /// An unregistered rule yields a single Warn advice, and a script that
    /// fails to parse yields a single syntax-error advice; in both cases
    /// no rule runs.
    pub fn check(
        &self,
        engine: Engine,
        kind: RuleKind,
        ctx: &AdvisorContext<'_>,
        sql: &str,
    ) -> AdvisorResult<Vec<Advice>> {
        if !self.supports(engine, kind) {
            return Ok(vec![not_applicable(engine, kind)]);
        }
        match ParsedScript::parse(engine, sql) {
            Ok(script) => self.check_script(engine, kind, ctx, &script),
            Err(e) => Ok(vec![Advice::syntax_error(e.parser_message())]),
        }
    }

    /// Run one rule over an already parsed script.
    pub fn check_script(
        &self,
        engine: Engine,
        kind: RuleKind,
        ctx: &AdvisorContext<'_>,
        script: &ParsedScript,
    ) -> AdvisorResult<Vec<Advice>> {
        match self.get(engine, kind) {
            Some(rule) => rule.check(ctx, script),
            None => Ok(vec![not_applicable(engine, kind)]),
        }
    }
}

fn not_applicable(engine: Engine, kind: RuleKind) -> Advice {
    log::debug!("Rule '{}' is not registered for {}", kind, engine);
    Advice::new(
        AdviceStatus::Warn,
        AdviceCode::Unsupported,
        kind.as_str(),
        format!("Rule \"{kind}\" is not applicable for engine {engine}"),
    )
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
