//! Table shape rules

use super::{object_name, or_ok};
use crate::advisor::{Advisor, ParsedScript};
use crate::context::AdvisorContext;
use crate::error::AdvisorResult;
use sg_core::{Advice, AdviceCode, RuleKind};
use sqlparser::ast::{AlterTableOperation, ColumnOption, CreateTable, Statement, TableConstraint};

/// Every table must keep a primary key.
pub struct RequirePrimaryKeyAdvisor;

impl Advisor for RequirePrimaryKeyAdvisor {
    fn kind(&self) -> RuleKind {
        RuleKind::TableRequirePk
    }

    fn check(&self, ctx: &AdvisorContext<'_>, script: &ParsedScript) -> AdvisorResult<Vec<Advice>> {
        let findings = script
            .statements
            .iter()
            .filter_map(|stmt| table_without_pk(&stmt.ast))
            .map(|table| {
                ctx.advice(
                    self.kind(),
                    AdviceCode::TableNoPK,
                    format!("Table `{table}` requires PRIMARY KEY"),
                )
            })
            .collect();
        Ok(or_ok(findings))
    }
}

fn table_without_pk(stmt: &Statement) -> Option<String> {
    match stmt {
        // CREATE TABLE ... AS / LIKE take their shape from elsewhere
        Statement::CreateTable(create)
            if create.query.is_none() && create.like.is_none() && !has_primary_key(create) =>
        {
            Some(object_name(&create.name))
        }
        Statement::AlterTable {
            name, operations, ..
        } if operations
            .iter()
            .any(|op| matches!(op, AlterTableOperation::DropPrimaryKey)) =>
        {
            Some(object_name(name))
        }
        _ => None,
    }
}

pub(crate) fn has_primary_key(create: &CreateTable) -> bool {
    !primary_key_columns(create).is_empty()
}

/// Columns covered by the primary key, whether declared inline or as a
/// table constraint.
pub(crate) fn primary_key_columns(create: &CreateTable) -> Vec<String> {
    let mut columns: Vec<String> = create
        .columns
        .iter()
        .filter(|col| col.options.iter().any(|o| is_primary(&o.option)))
        .map(|col| col.name.value.clone())
        .collect();
    for constraint in &create.constraints {
        if let TableConstraint::PrimaryKey { columns: pk, .. } = constraint {
            columns.extend(pk.iter().map(|i| i.value.clone()));
        }
    }
    columns
}

pub(crate) fn is_primary(option: &ColumnOption) -> bool {
    matches!(
        option,
        ColumnOption::Unique {
            is_primary: true,
            ..
        }
    )
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;
