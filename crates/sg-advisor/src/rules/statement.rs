//! Statement-level DML rules
//!
//! Each rule reports at most one finding per statement, quoting the
//! statement as written. Subqueries count toward the enclosing statement.

use super::{any_expr, any_select, or_ok};
use crate::advisor::{Advisor, ParsedScript};
use crate::context::AdvisorContext;
use crate::error::AdvisorResult;
use sg_core::{Advice, AdviceCode, RuleKind};
use sqlparser::ast::{Expr, SelectItem, Statement, Value};

fn per_statement(
    ctx: &AdvisorContext<'_>,
    script: &ParsedScript,
    kind: RuleKind,
    code: AdviceCode,
    suffix: &str,
    violates: impl Fn(&Statement) -> bool,
) -> Vec<Advice> {
    let findings = script
        .statements
        .iter()
        .filter(|stmt| violates(&stmt.ast))
        .map(|stmt| ctx.advice(kind, code, format!("\"{}\" {}", stmt.text, suffix)))
        .collect();
    or_ok(findings)
}

/// Forbids `SELECT *` and `SELECT t.*`.
pub struct NoSelectAllAdvisor;

impl Advisor for NoSelectAllAdvisor {
    fn kind(&self) -> RuleKind {
        RuleKind::StatementNoSelectAll
    }

    fn check(&self, ctx: &AdvisorContext<'_>, script: &ParsedScript) -> AdvisorResult<Vec<Advice>> {
        Ok(per_statement(
            ctx,
            script,
            self.kind(),
            AdviceCode::StatementSelectAll,
            "uses SELECT all",
            selects_all,
        ))
    }
}

fn selects_all(stmt: &Statement) -> bool {
    any_select(stmt, |select| {
        select.projection.iter().any(|item| {
            matches!(
                item,
                SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(..)
            )
        })
    })
}

/// UPDATE, DELETE and SELECT ... FROM must carry a WHERE clause.
pub struct RequireWhereAdvisor;

impl Advisor for RequireWhereAdvisor {
    fn kind(&self) -> RuleKind {
        RuleKind::StatementRequireWhere
    }

    fn check(&self, ctx: &AdvisorContext<'_>, script: &ParsedScript) -> AdvisorResult<Vec<Advice>> {
        Ok(per_statement(
            ctx,
            script,
            self.kind(),
            AdviceCode::StatementNoWhere,
            "requires WHERE clause",
            missing_where,
        ))
    }
}

fn missing_where(stmt: &Statement) -> bool {
    match stmt {
        Statement::Delete(delete) if delete.selection.is_none() => true,
        Statement::Update {
            selection: None, ..
        } => true,
        _ => any_select(stmt, |select| {
            !select.from.is_empty() && select.selection.is_none()
        }),
    }
}

/// Flags `LIKE` patterns that start with `%` or `_`.
pub struct NoLeadingWildcardLikeAdvisor;

impl Advisor for NoLeadingWildcardLikeAdvisor {
    fn kind(&self) -> RuleKind {
        RuleKind::StatementNoLeadingWildcardLike
    }

    fn check(&self, ctx: &AdvisorContext<'_>, script: &ParsedScript) -> AdvisorResult<Vec<Advice>> {
        Ok(per_statement(
            ctx,
            script,
            self.kind(),
            AdviceCode::StatementLeadingWildcardLike,
            "uses leading wildcard LIKE",
            |stmt| any_expr(stmt, is_leading_wildcard_like),
        ))
    }
}

fn is_leading_wildcard_like(expr: &Expr) -> bool {
    let pattern = match expr {
        Expr::Like { pattern, .. } | Expr::ILike { pattern, .. } => pattern.as_ref(),
        _ => return false,
    };
    match pattern {
        Expr::Value(Value::SingleQuotedString(p) | Value::DoubleQuotedString(p)) => {
            p.starts_with('%') || p.starts_with('_')
        }
        _ => false,
    }
}

#[cfg(test)]
#[path = "statement_test.rs"]
mod tests;
