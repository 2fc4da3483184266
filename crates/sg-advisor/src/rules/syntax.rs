//! Parse-only rules

use crate::advisor::{Advisor, ParsedScript};
use crate::context::AdvisorContext;
use crate::error::AdvisorResult;
use sg_core::{Advice, RuleKind};

/// Reaching a rule means the script parsed, so a syntax rule only ever
/// reports OK. Syntax errors are turned into advice by the dispatcher.
pub struct SyntaxAdvisor {
    kind: RuleKind,
}

impl SyntaxAdvisor {
    pub fn mysql() -> Self {
        Self {
            kind: RuleKind::MySqlSyntax,
        }
    }

    pub fn postgres() -> Self {
        Self {
            kind: RuleKind::PostgresSyntax,
        }
    }
}

impl Advisor for SyntaxAdvisor {
    fn kind(&self) -> RuleKind {
        self.kind
    }

    fn check(&self, _ctx: &AdvisorContext<'_>, _script: &ParsedScript) -> AdvisorResult<Vec<Advice>> {
        Ok(vec![Advice::ok()])
    }
}
