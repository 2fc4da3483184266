//! Backward-incompatible DDL detection

use super::or_ok;
use crate::advisor::{Advisor, ParsedScript};
use crate::context::AdvisorContext;
use crate::error::AdvisorResult;
use sg_core::{Advice, AdviceCode, RuleKind};
use sqlparser::ast::{
    AlterColumnOperation, AlterTableOperation, ObjectType, Statement, TableConstraint,
};

/// Warns about DDL that can break existing data or application code:
/// dropping or renaming objects, changing column types, and adding
/// constraints that existing rows may violate.
pub struct BackwardCompatibilityAdvisor;

impl Advisor for BackwardCompatibilityAdvisor {
    fn kind(&self) -> RuleKind {
        RuleKind::BackwardCompatibility
    }

    fn check(&self, ctx: &AdvisorContext<'_>, script: &ParsedScript) -> AdvisorResult<Vec<Advice>> {
        let findings = script
            .statements
            .iter()
            .filter_map(|stmt| {
                incompatibility(&stmt.ast).map(|code| {
                    ctx.advice(
                        self.kind(),
                        code,
                        format!(
                            "\"{}\" may cause incompatibility with the existing data and code",
                            stmt.text
                        ),
                    )
                })
            })
            .collect();
        Ok(or_ok(findings))
    }
}

/// The first incompatible change a statement makes, if any.
fn incompatibility(stmt: &Statement) -> Option<AdviceCode> {
    match stmt {
        Statement::Drop { object_type, .. } => match object_type {
            ObjectType::Database | ObjectType::Schema => {
                Some(AdviceCode::CompatibilityDropDatabase)
            }
            ObjectType::Table => Some(AdviceCode::CompatibilityDropTable),
            _ => None,
        },
        Statement::CreateIndex(create) if create.unique => {
            Some(AdviceCode::CompatibilityAddUniqueKey)
        }
        Statement::AlterTable { operations, .. } => operations.iter().find_map(alter_operation),
        _ => None,
    }
}

fn alter_operation(op: &AlterTableOperation) -> Option<AdviceCode> {
    match op {
        AlterTableOperation::RenameTable { .. } => Some(AdviceCode::CompatibilityRenameTable),
        AlterTableOperation::RenameColumn { .. } => Some(AdviceCode::CompatibilityRenameColumn),
        AlterTableOperation::ChangeColumn {
            old_name, new_name, ..
        } if old_name.value != new_name.value => Some(AdviceCode::CompatibilityRenameColumn),
        AlterTableOperation::DropColumn { .. } => Some(AdviceCode::CompatibilityDropColumn),
        AlterTableOperation::AddConstraint(constraint) => match constraint {
            TableConstraint::PrimaryKey { .. } => Some(AdviceCode::CompatibilityAddPrimaryKey),
            TableConstraint::Unique { .. } => Some(AdviceCode::CompatibilityAddUniqueKey),
            TableConstraint::ForeignKey { .. } => Some(AdviceCode::CompatibilityAddForeignKey),
            TableConstraint::Check { .. } => Some(AdviceCode::CompatibilityAddCheck),
            _ => None,
        },
        AlterTableOperation::ChangeColumn { .. } | AlterTableOperation::ModifyColumn { .. } => {
            Some(AdviceCode::CompatibilityAlterColumn)
        }
        AlterTableOperation::AlterColumn { op, .. } => match op {
            AlterColumnOperation::SetDataType { .. } | AlterColumnOperation::SetNotNull => {
                Some(AdviceCode::CompatibilityAlterColumn)
            }
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
#[path = "compatibility_test.rs"]
mod tests;
