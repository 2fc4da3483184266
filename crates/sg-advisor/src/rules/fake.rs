//! Conformance fixture that reports one finding of each severity

use crate::advisor::{Advisor, ParsedScript};
use crate::context::AdvisorContext;
use crate::error::AdvisorResult;
use sg_core::{Advice, AdviceCode, AdviceStatus, RuleKind};

/// Returns exactly three advices, in severity order, for any input.
pub struct FakeAdvisor;

impl Advisor for FakeAdvisor {
    fn kind(&self) -> RuleKind {
        RuleKind::Fake
    }

    fn check(&self, _ctx: &AdvisorContext<'_>, script: &ParsedScript) -> AdvisorResult<Vec<Advice>> {
        Ok(vec![
            Advice::new(
                AdviceStatus::Success,
                AdviceCode::Ok,
                "INFO check",
                script.text.as_str(),
            ),
            Advice::new(
                AdviceStatus::Warn,
                AdviceCode::Internal,
                "WARN check",
                script.text.as_str(),
            ),
            Advice::new(
                AdviceStatus::Error,
                AdviceCode::Internal,
                "ERROR check",
                script.text.as_str(),
            ),
        ])
    }
}
