//! Storage engine rule for the MySQL family

use super::{object_name, or_ok};
use crate::advisor::{Advisor, ParsedScript};
use crate::context::AdvisorContext;
use crate::error::AdvisorResult;
use sg_core::{Advice, AdviceCode, RuleKind};
use sqlparser::ast::{Expr, Statement, Value};

const INNODB: &str = "innodb";

/// Flags tables created with an explicit non-InnoDB engine and sessions
/// switching the default storage engine away from InnoDB.
pub struct UseInnoDbAdvisor;

impl Advisor for UseInnoDbAdvisor {
    fn kind(&self) -> RuleKind {
        RuleKind::MySqlEngine
    }

    fn check(&self, ctx: &AdvisorContext<'_>, script: &ParsedScript) -> AdvisorResult<Vec<Advice>> {
        let findings = script
            .statements
            .iter()
            .filter(|stmt| uses_other_engine(&stmt.ast))
            .map(|stmt| {
                ctx.advice(
                    self.kind(),
                    AdviceCode::NotInnoDBEngine,
                    format!("\"{}\" doesn't use InnoDB engine", stmt.text),
                )
            })
            .collect();
        Ok(or_ok(findings))
    }
}

fn uses_other_engine(stmt: &Statement) -> bool {
    match stmt {
        Statement::CreateTable(create) => create
            .engine
            .as_ref()
            .is_some_and(|engine| !engine.name.eq_ignore_ascii_case(INNODB)),
        Statement::SetVariable {
            variables, value, ..
        } => {
            let sets_engine = variables
                .iter()
                .any(|v| object_name(v).eq_ignore_ascii_case("default_storage_engine"));
            sets_engine
                && value
                    .first()
                    .and_then(engine_value)
                    .is_some_and(|engine| !engine.eq_ignore_ascii_case(INNODB))
        }
        _ => false,
    }
}

fn engine_value(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Identifier(ident) => Some(&ident.value),
        Expr::Value(Value::SingleQuotedString(s) | Value::DoubleQuotedString(s)) => Some(s),
        _ => None,
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
