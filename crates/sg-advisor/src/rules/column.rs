//! Column presence and nullability rules

use super::table::{is_primary, primary_key_columns};
use super::{object_name, or_ok};
use crate::advisor::{Advisor, ParsedScript};
use crate::context::AdvisorContext;
use crate::error::AdvisorResult;
use sg_core::{Advice, AdviceCode, RequiredColumnPayload, RuleKind};
use sqlparser::ast::{AlterColumnOperation, AlterTableOperation, ColumnOption, Statement};
use std::collections::BTreeSet;

/// Tables must define, and keep, every column in the payload's
/// `columnList`.
pub struct RequiredColumnAdvisor;

impl Advisor for RequiredColumnAdvisor {
    fn kind(&self) -> RuleKind {
        RuleKind::ColumnRequired
    }

    fn check(&self, ctx: &AdvisorContext<'_>, script: &ParsedScript) -> AdvisorResult<Vec<Advice>> {
        let payload: RequiredColumnPayload = ctx.decode_payload(self.kind())?;
        let required: BTreeSet<&str> = payload.column_list.iter().map(String::as_str).collect();

        let mut findings = Vec::new();
        for stmt in &script.statements {
            let Some((table, missing)) = missing_columns(&stmt.ast, &required) else {
                continue;
            };
            if missing.is_empty() {
                continue;
            }
            let list: Vec<&str> = missing.into_iter().collect();
            findings.push(ctx.advice(
                self.kind(),
                AdviceCode::NoRequiredColumn,
                format!("Table `{}` requires columns: {}", table, list.join(", ")),
            ));
        }
        Ok(or_ok(findings))
    }
}

/// The table a statement defines or alters, with the required columns it
/// lacks or takes away, in sorted order.
fn missing_columns<'r>(
    stmt: &Statement,
    required: &BTreeSet<&'r str>,
) -> Option<(String, BTreeSet<&'r str>)> {
    match stmt {
        Statement::CreateTable(create) if create.query.is_none() && create.like.is_none() => {
            let present: BTreeSet<&str> =
                create.columns.iter().map(|c| c.name.value.as_str()).collect();
            let missing = required
                .iter()
                .filter(|column| !present.contains(**column))
                .copied()
                .collect();
            Some((object_name(&create.name), missing))
        }
        Statement::AlterTable {
            name, operations, ..
        } => {
            let mut missing = BTreeSet::new();
            for op in operations {
                let removed = match op {
                    AlterTableOperation::DropColumn { column_name, .. } => Some(column_name),
                    AlterTableOperation::RenameColumn {
                        old_column_name,
                        new_column_name,
                    } if old_column_name.value != new_column_name.value => Some(old_column_name),
                    AlterTableOperation::ChangeColumn {
                        old_name, new_name, ..
                    } if old_name.value != new_name.value => Some(old_name),
                    _ => None,
                };
                if let Some(column) = removed.and_then(|c| required.get(c.value.as_str())) {
                    missing.insert(*column);
                }
            }
            Some((object_name(name), missing))
        }
        _ => None,
    }
}

/// Columns must be declared NOT NULL. Primary key columns are exempt.
pub struct ColumnNoNullAdvisor;

impl Advisor for ColumnNoNullAdvisor {
    fn kind(&self) -> RuleKind {
        RuleKind::ColumnNoNull
    }

    fn check(&self, ctx: &AdvisorContext<'_>, script: &ParsedScript) -> AdvisorResult<Vec<Advice>> {
        let mut findings = Vec::new();
        for stmt in &script.statements {
            for (table, column) in nullable_columns(&stmt.ast) {
                findings.push(ctx.advice(
                    self.kind(),
                    AdviceCode::ColumnCanNotNull,
                    format!("`{table}`.`{column}` can not have NULL value"),
                ));
            }
        }
        Ok(or_ok(findings))
    }
}

fn nullable_columns(stmt: &Statement) -> Vec<(String, String)> {
    match stmt {
        Statement::CreateTable(create) => {
            let table = object_name(&create.name);
            let pk = primary_key_columns(create);
            create
                .columns
                .iter()
                .filter(|col| !pk.contains(&col.name.value))
                .filter(|col| is_nullable(col.options.iter().map(|o| &o.option)))
                .map(|col| (table.clone(), col.name.value.clone()))
                .collect()
        }
        Statement::AlterTable {
            name, operations, ..
        } => {
            let table = object_name(name);
            operations
                .iter()
                .filter_map(|op| match op {
                    AlterTableOperation::AddColumn { column_def, .. }
                        if is_nullable(column_def.options.iter().map(|o| &o.option)) =>
                    {
                        Some(column_def.name.value.clone())
                    }
                    AlterTableOperation::ChangeColumn {
                        new_name, options, ..
                    } if is_nullable(options.iter()) => Some(new_name.value.clone()),
                    AlterTableOperation::ModifyColumn {
                        col_name, options, ..
                    } if is_nullable(options.iter()) => Some(col_name.value.clone()),
                    AlterTableOperation::AlterColumn {
                        column_name,
                        op: AlterColumnOperation::DropNotNull,
                    } => Some(column_name.value.clone()),
                    _ => None,
                })
                .map(|column| (table.clone(), column))
                .collect()
        }
        _ => Vec::new(),
    }
}

/// A column definition allows NULL unless it says NOT NULL or is the
/// primary key.
fn is_nullable<'a>(mut options: impl Iterator<Item = &'a ColumnOption>) -> bool {
    !options.any(|o| matches!(o, ColumnOption::NotNull) || is_primary(o))
}

#[cfg(test)]
#[path = "column_test.rs"]
mod tests;
