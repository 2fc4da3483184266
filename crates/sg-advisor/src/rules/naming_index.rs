//! Index, unique key and foreign key naming conventions
//!
//! The payload `format` is a template such as `^idx_{{table}}_{{column_list}}$`.
//! Placeholders are filled from the index being named and the result is
//! matched as a regex against the actual name.

use super::naming::compile_format;
use super::{ident_list, object_name, or_ok};
use crate::advisor::{Advisor, ParsedScript};
use crate::context::AdvisorContext;
use crate::error::{AdvisorError, AdvisorResult};
use sg_core::{Advice, AdviceCode, CatalogError, NamingPayload, RuleKind};
use sqlparser::ast::{AlterIndexOperation, AlterTableOperation, Expr, Statement, TableConstraint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Index,
    UniqueKey,
    ForeignKey,
}

impl Category {
    fn label(self) -> &'static str {
        match self {
            Category::Index => "Index",
            Category::UniqueKey => "Unique key",
            Category::ForeignKey => "Foreign key",
        }
    }

    fn code(self) -> AdviceCode {
        match self {
            Category::Index => AdviceCode::NamingIndexConventionMismatch,
            Category::UniqueKey => AdviceCode::NamingUniqueKeyConventionMismatch,
            Category::ForeignKey => AdviceCode::NamingForeignKeyConventionMismatch,
        }
    }
}

/// One named index-like object found in a statement.
#[derive(Debug, Clone, PartialEq)]
struct NamedIndex {
    category: Category,
    name: String,
    table: String,
    columns: Vec<String>,
    /// Referenced table and columns for foreign keys.
    referenced: Option<(String, Vec<String>)>,
}

impl NamedIndex {
    fn expand(&self, template: &str) -> String {
        match &self.referenced {
            Some((ref_table, ref_columns)) => template
                .replace("{{referencing_table}}", &self.table)
                .replace("{{referencing_column}}", &self.columns.join("_"))
                .replace("{{referenced_table}}", ref_table)
                .replace("{{referenced_column}}", &ref_columns.join("_")),
            None => template
                .replace("{{table}}", &self.table)
                .replace("{{column_list}}", &self.columns.join("_")),
        }
    }
}

/// Naming convention for one of `naming.index.idx`, `naming.index.uk`
/// or `naming.index.fk`.
pub struct NamingIndexAdvisor {
    kind: RuleKind,
    category: Category,
}

impl NamingIndexAdvisor {
    pub fn index() -> Self {
        Self {
            kind: RuleKind::NamingIndex,
            category: Category::Index,
        }
    }

    pub fn unique_key() -> Self {
        Self {
            kind: RuleKind::NamingUniqueKey,
            category: Category::UniqueKey,
        }
    }

    pub fn foreign_key() -> Self {
        Self {
            kind: RuleKind::NamingForeignKey,
            category: Category::ForeignKey,
        }
    }
}

impl Advisor for NamingIndexAdvisor {
    fn kind(&self) -> RuleKind {
        self.kind
    }

    fn check(&self, ctx: &AdvisorContext<'_>, script: &ParsedScript) -> AdvisorResult<Vec<Advice>> {
        let payload: NamingPayload = ctx.decode_payload(self.kind)?;

        let mut findings = Vec::new();
        for stmt in &script.statements {
            for index in named_indexes(ctx, &stmt.ast)? {
                if index.category != self.category {
                    continue;
                }
                let expected = index.expand(&payload.format);
                let regex = compile_format(self.kind, &expected)?;
                if !regex.is_match(&index.name) {
                    findings.push(ctx.advice(
                        self.kind,
                        self.category.code(),
                        format!(
                            "{} in table `{}` mismatches the naming convention, expect \"{}\" but found `{}`",
                            self.category.label(),
                            index.table,
                            expected,
                            index.name
                        ),
                    ));
                }
            }
        }
        Ok(or_ok(findings))
    }
}

fn named_indexes(ctx: &AdvisorContext<'_>, stmt: &Statement) -> AdvisorResult<Vec<NamedIndex>> {
    let mut found = Vec::new();
    match stmt {
        Statement::CreateTable(create) => {
            let table = object_name(&create.name);
            found.extend(
                create
                    .constraints
                    .iter()
                    .filter_map(|c| from_constraint(&table, c)),
            );
        }
        Statement::CreateIndex(create) => {
            if let Some(name) = &create.name {
                found.push(NamedIndex {
                    category: if create.unique {
                        Category::UniqueKey
                    } else {
                        Category::Index
                    },
                    name: object_name(name),
                    table: object_name(&create.table_name),
                    columns: create.columns.iter().map(|c| column_expr(&c.expr)).collect(),
                    referenced: None,
                });
            }
        }
        Statement::AlterTable {
            name, operations, ..
        } => {
            let table = object_name(name);
            for op in operations {
                match op {
                    AlterTableOperation::AddConstraint(constraint) => {
                        found.extend(from_constraint(&table, constraint));
                    }
                    AlterTableOperation::RenameConstraint { old_name, new_name } => {
                        found.extend(renamed(ctx, &old_name.value, &new_name.value)?);
                    }
                    _ => {}
                }
            }
        }
        Statement::AlterIndex {
            name,
            operation: AlterIndexOperation::RenameIndex { index_name },
        } => {
            found.extend(renamed(ctx, &object_name(name), &object_name(index_name))?);
        }
        _ => {}
    }
    Ok(found)
}

fn from_constraint(table: &str, constraint: &TableConstraint) -> Option<NamedIndex> {
    match constraint {
        TableConstraint::Index {
            name: Some(name),
            columns,
            ..
        } => Some(NamedIndex {
            category: Category::Index,
            name: name.value.clone(),
            table: table.to_string(),
            columns: ident_list(columns),
            referenced: None,
        }),
        TableConstraint::Unique {
            name,
            index_name,
            columns,
            ..
        } => index_name.as_ref().or(name.as_ref()).map(|name| NamedIndex {
            category: Category::UniqueKey,
            name: name.value.clone(),
            table: table.to_string(),
            columns: ident_list(columns),
            referenced: None,
        }),
        TableConstraint::ForeignKey {
            name: Some(name),
            columns,
            foreign_table,
            referred_columns,
            ..
        } => Some(NamedIndex {
            category: Category::ForeignKey,
            name: name.value.clone(),
            table: table.to_string(),
            columns: ident_list(columns),
            referenced: Some((object_name(foreign_table), ident_list(referred_columns))),
        }),
        _ => None,
    }
}

/// A rename only carries names, so the table, columns and uniqueness of
/// the index come from the catalog. Unknown indexes are skipped.
fn renamed(
    ctx: &AdvisorContext<'_>,
    old_name: &str,
    new_name: &str,
) -> AdvisorResult<Option<NamedIndex>> {
    let index = match ctx.catalog.find_index(&ctx.namespace, old_name) {
        Ok(index) => index,
        Err(CatalogError::IndexNotFound { .. }) => {
            log::debug!("Index '{}' not in catalog, skipping rename check", old_name);
            return Ok(None);
        }
        Err(e) => return Err(AdvisorError::Catalog(e)),
    };
    if index.primary {
        return Ok(None);
    }
    Ok(Some(NamedIndex {
        category: if index.unique {
            Category::UniqueKey
        } else {
            Category::Index
        },
        name: new_name.to_string(),
        table: index.table,
        columns: index.columns,
        referenced: None,
    }))
}

fn column_expr(expr: &Expr) -> String {
    match expr {
        Expr::Identifier(ident) => ident.value.clone(),
        Expr::CompoundIdentifier(idents) => idents
            .last()
            .map(|i| i.value.clone())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "naming_index_test.rs"]
mod tests;
