//! Policy-wide checking: run every enabled rule of a policy over one script

use crate::advisor::ParsedScript;
use crate::context::AdvisorContext;
use crate::error::{AdvisorError, AdvisorResult};
use crate::registry::Registry;
use sg_core::{Advice, AdviceCode, AdviceStatus, Engine, Feature, Plan, Policy, RuleKind};

/// Title of the advice returned when there is no policy to apply.
pub const EMPTY_POLICY_TITLE: &str = "Empty schema review policy or disabled";

/// Applies a review policy using the rules of a [`Registry`].
pub struct PolicyChecker<'r> {
    registry: &'r Registry,
    plan: Plan,
}

impl<'r> PolicyChecker<'r> {
    pub fn new(registry: &'r Registry, plan: Plan) -> Self {
        Self { registry, plan }
    }

    /// Check `sql` against `policy`.
    ///
    /// The script is parsed once. Advice is the concatenation of each
    /// enabled rule's output in policy order; nothing is deduplicated.
    pub fn check(
        &self,
        engine: Engine,
        policy: Option<&Policy>,
        ctx: &AdvisorContext<'_>,
        sql: &str,
    ) -> AdvisorResult<Vec<Advice>> {
        let Some(policy) = policy.filter(|p| p.is_active() && p.enabled_rules().next().is_some())
        else {
            return Ok(vec![Advice::new(
                AdviceStatus::Warn,
                AdviceCode::NotFound,
                EMPTY_POLICY_TITLE,
                "",
            )]);
        };

        self.require(Feature::SchemaReviewPolicy)?;
        if policy.contains(RuleKind::BackwardCompatibility) {
            self.require(Feature::BackwardCompatibility)?;
        }

        let script = match ParsedScript::parse(engine, sql) {
            Ok(script) => script,
            Err(e) => return Ok(vec![Advice::syntax_error(e.parser_message())]),
        };

        let mut advices = Vec::new();
        for rule in policy.enabled_rules() {
            let rule_ctx = ctx.for_rule(rule);
            advices.extend(
                self.registry
                    .check_script(engine, rule.kind, &rule_ctx, &script)?,
            );
        }
        log::debug!(
            "Policy check on {} statement(s) produced {} advice(s)",
            script.statements.len(),
            advices.len()
        );
        Ok(advices)
    }

    fn require(&self, feature: Feature) -> AdvisorResult<()> {
        if self.plan.allows(feature) {
            Ok(())
        } else {
            Err(AdvisorError::AccessDenied {
                feature: feature.name(),
                required: feature.minimum_plan(),
                current: self.plan,
            })
        }
    }
}

/// Drop the OK advices; a fully clean result collapses to a single OK.
pub fn summarize(advices: Vec<Advice>) -> Vec<Advice> {
    let findings: Vec<Advice> = advices
        .into_iter()
        .filter(|a| a.status != AdviceStatus::Success)
        .collect();
    if findings.is_empty() {
        vec![Advice::ok()]
    } else {
        findings
    }
}

/// Most severe status among `advices`, `Success` when empty.
pub fn worst_status(advices: &[Advice]) -> AdviceStatus {
    advices
        .iter()
        .map(|a| a.status)
        .max()
        .unwrap_or(AdviceStatus::Success)
}

#[cfg(test)]
#[path = "checker_test.rs"]
mod tests;
