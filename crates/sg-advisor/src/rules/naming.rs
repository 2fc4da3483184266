//! Table and column naming conventions

use super::{object_name, or_ok};
use crate::advisor::{Advisor, ParsedScript};
use crate::context::AdvisorContext;
use crate::error::{AdvisorError, AdvisorResult};
use regex::Regex;
use sg_core::{Advice, AdviceCode, NamingPayload, RuleKind};
use sqlparser::ast::{AlterTableOperation, Statement};

/// Compile `format` for `kind`, rejecting invalid patterns.
pub(crate) fn compile_format(kind: RuleKind, format: &str) -> AdvisorResult<Regex> {
    Regex::new(format).map_err(|e| AdvisorError::InvalidNamingFormat {
        kind,
        format: format.to_string(),
        message: e.to_string(),
    })
}

fn naming_format(ctx: &AdvisorContext<'_>, kind: RuleKind) -> AdvisorResult<(String, Regex)> {
    let payload: NamingPayload = ctx.decode_payload(kind)?;
    let regex = compile_format(kind, &payload.format)?;
    Ok((payload.format, regex))
}

/// Table names created or renamed to must match the configured regex.
pub struct NamingTableAdvisor;

impl Advisor for NamingTableAdvisor {
    fn kind(&self) -> RuleKind {
        RuleKind::NamingTable
    }

    fn check(&self, ctx: &AdvisorContext<'_>, script: &ParsedScript) -> AdvisorResult<Vec<Advice>> {
        let (format, regex) = naming_format(ctx, self.kind())?;

        let mut findings = Vec::new();
        for stmt in &script.statements {
            for table in table_names(&stmt.ast) {
                if !regex.is_match(&table) {
                    findings.push(ctx.advice(
                        self.kind(),
                        AdviceCode::NamingTableConventionMismatch,
                        format!(
                            "`{table}` mismatches table naming convention, naming format should be \"{format}\""
                        ),
                    ));
                }
            }
        }
        Ok(or_ok(findings))
    }
}

/// Names a statement gives to tables.
fn table_names(stmt: &Statement) -> Vec<String> {
    match stmt {
        Statement::CreateTable(create) => vec![object_name(&create.name)],
        Statement::AlterTable { operations, .. } => operations
            .iter()
            .filter_map(|op| match op {
                AlterTableOperation::RenameTable { table_name } => Some(object_name(table_name)),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Column names created or renamed to must match the configured regex.
pub struct NamingColumnAdvisor;

impl Advisor for NamingColumnAdvisor {
    fn kind(&self) -> RuleKind {
        RuleKind::NamingColumn
    }

    fn check(&self, ctx: &AdvisorContext<'_>, script: &ParsedScript) -> AdvisorResult<Vec<Advice>> {
        let (format, regex) = naming_format(ctx, self.kind())?;

        let mut findings = Vec::new();
        for stmt in &script.statements {
            for (table, column) in column_names(&stmt.ast) {
                if !regex.is_match(&column) {
                    findings.push(ctx.advice(
                        self.kind(),
                        AdviceCode::NamingColumnConventionMismatch,
                        format!(
                            "`{table}`.`{column}` mismatches column naming convention, naming format should be \"{format}\""
                        ),
                    ));
                }
            }
        }
        Ok(or_ok(findings))
    }
}

/// (table, column) pairs for every column name a statement introduces.
fn column_names(stmt: &Statement) -> Vec<(String, String)> {
    match stmt {
        Statement::CreateTable(create) => {
            let table = object_name(&create.name);
            create
                .columns
                .iter()
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
                    AlterTableOperation::AddColumn { column_def, .. } => {
                        Some(column_def.name.value.clone())
                    }
                    AlterTableOperation::RenameColumn {
                        new_column_name, ..
                    } => Some(new_column_name.value.clone()),
                    AlterTableOperation::ChangeColumn { new_name, .. } => {
                        Some(new_name.value.clone())
                    }
                    _ => None,
                })
                .map(|column| (table.clone(), column))
                .collect()
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "naming_test.rs"]
mod tests;
