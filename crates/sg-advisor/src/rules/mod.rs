//! Built-in review rules and the AST helpers they share

pub mod column;
pub mod compatibility;
pub mod engine;
pub mod fake;
pub mod naming;
pub mod naming_index;
pub mod statement;
pub mod syntax;
pub mod table;

use sg_core::Advice;
use sqlparser::ast::{
    visit_expressions, Expr, Ident, ObjectName, Query, Select, SetExpr, Statement, Visit, Visitor,
};
use std::ops::ControlFlow;

/// A rule's result: its findings, or one OK advice when there are none.
pub(crate) fn or_ok(findings: Vec<Advice>) -> Vec<Advice> {
    if findings.is_empty() {
        vec![Advice::ok()]
    } else {
        findings
    }
}

/// Unquoted last part of a possibly qualified name.
pub(crate) fn object_name(name: &ObjectName) -> String {
    name.0
        .last()
        .map(|ident| ident.value.clone())
        .unwrap_or_default()
}

pub(crate) fn ident_list(idents: &[Ident]) -> Vec<String> {
    idents.iter().map(|i| i.value.clone()).collect()
}

/// True when `pred` holds for any SELECT anywhere in `stmt`, including
/// subqueries, CTEs, derived tables and set operations.
pub(crate) fn any_select(stmt: &Statement, pred: impl FnMut(&Select) -> bool) -> bool {
    stmt.visit(&mut SelectVisitor { pred }).is_break()
}

/// True when `pred` holds for any expression anywhere in `stmt`.
pub(crate) fn any_expr(stmt: &Statement, mut pred: impl FnMut(&Expr) -> bool) -> bool {
    visit_expressions(stmt, |expr| {
        if pred(expr) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })
    .is_break()
}

struct SelectVisitor<F> {
    pred: F,
}

impl<F: FnMut(&Select) -> bool> Visitor for SelectVisitor<F> {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<()> {
        if set_expr_any(&query.body, &mut self.pred) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

// Nested `SetExpr::Query` bodies are reached by the visitor itself.
fn set_expr_any<F: FnMut(&Select) -> bool>(body: &SetExpr, pred: &mut F) -> bool {
    match body {
        SetExpr::Select(select) => pred(select),
        SetExpr::SetOperation { left, right, .. } => {
            set_expr_any(left, pred) || set_expr_any(right, pred)
        }
        _ => false,
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
