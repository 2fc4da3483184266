//! Schema review policy model.

use crate::advice::AdviceStatus;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Identifies one rule implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleKind {
    #[serde(rename = "fake")]
    Fake,
    #[serde(rename = "mysql.syntax")]
    MySqlSyntax,
    #[serde(rename = "pg.syntax")]
    PostgresSyntax,
    #[serde(rename = "engine.mysql.use-innodb")]
    MySqlEngine,
    #[serde(rename = "naming.table")]
    NamingTable,
    #[serde(rename = "naming.column")]
    NamingColumn,
    #[serde(rename = "naming.index.idx")]
    NamingIndex,
    #[serde(rename = "naming.index.uk")]
    NamingUniqueKey,
    #[serde(rename = "naming.index.fk")]
    NamingForeignKey,
    #[serde(rename = "statement.select.no-select-all")]
    StatementNoSelectAll,
    #[serde(rename = "statement.where.require")]
    StatementRequireWhere,
    #[serde(rename = "statement.where.no-leading-wildcard-like")]
    StatementNoLeadingWildcardLike,
    #[serde(rename = "table.require-pk")]
    TableRequirePk,
    #[serde(rename = "column.required")]
    ColumnRequired,
    #[serde(rename = "column.no-null")]
    ColumnNoNull,
    #[serde(rename = "schema.backward-compatibility")]
    BackwardCompatibility,
}

impl RuleKind {
    pub const ALL: [RuleKind; 16] = [
        RuleKind::Fake,
        RuleKind::MySqlSyntax,
        RuleKind::PostgresSyntax,
        RuleKind::MySqlEngine,
        RuleKind::NamingTable,
        RuleKind::NamingColumn,
        RuleKind::NamingIndex,
        RuleKind::NamingUniqueKey,
        RuleKind::NamingForeignKey,
        RuleKind::StatementNoSelectAll,
        RuleKind::StatementRequireWhere,
        RuleKind::StatementNoLeadingWildcardLike,
        RuleKind::TableRequirePk,
        RuleKind::ColumnRequired,
        RuleKind::ColumnNoNull,
        RuleKind::BackwardCompatibility,
    ];

    /// The policy-facing rule type string. Also used as advice title.
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::Fake => "fake",
            RuleKind::MySqlSyntax => "mysql.syntax",
            RuleKind::PostgresSyntax => "pg.syntax",
            RuleKind::MySqlEngine => "engine.mysql.use-innodb",
            RuleKind::NamingTable => "naming.table",
            RuleKind::NamingColumn => "naming.column",
            RuleKind::NamingIndex => "naming.index.idx",
            RuleKind::NamingUniqueKey => "naming.index.uk",
            RuleKind::NamingForeignKey => "naming.index.fk",
            RuleKind::StatementNoSelectAll => "statement.select.no-select-all",
            RuleKind::StatementRequireWhere => "statement.where.require",
            RuleKind::StatementNoLeadingWildcardLike => "statement.where.no-leading-wildcard-like",
            RuleKind::TableRequirePk => "table.require-pk",
            RuleKind::ColumnRequired => "column.required",
            RuleKind::ColumnNoNull => "column.no-null",
            RuleKind::BackwardCompatibility => "schema.backward-compatibility",
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RuleKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::UnknownValue {
                what: "rule type",
                value: s.to_string(),
            })
    }
}

/// Configured severity of a rule inside a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleLevel {
    #[default]
    Error,
    Warning,
    Disabled,
}

impl RuleLevel {
    /// Status of the findings a rule at this level produces.
    pub fn advice_status(self) -> AdviceStatus {
        match self {
            RuleLevel::Error => AdviceStatus::Error,
            RuleLevel::Warning => AdviceStatus::Warn,
            RuleLevel::Disabled => AdviceStatus::Success,
        }
    }
}

/// Policy row status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    #[default]
    Normal,
    Archived,
}

/// One configured rule: kind, level, and an opaque kind-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRule {
    #[serde(rename = "type")]
    pub kind: RuleKind,

    #[serde(default)]
    pub level: RuleLevel,

    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Payload for naming rules. `format` is a regex for table and column
/// names and a `{{placeholder}}` template for index names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingPayload {
    pub format: String,
}

/// Payload for `column.required`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredColumnPayload {
    #[serde(rename = "columnList")]
    pub column_list: Vec<String>,
}

impl PolicyRule {
    pub fn new(kind: RuleKind, level: RuleLevel) -> Self {
        Self {
            kind,
            level,
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn naming_payload(&self) -> CoreResult<NamingPayload> {
        self.decode_payload()
    }

    pub fn required_column_payload(&self) -> CoreResult<RequiredColumnPayload> {
        self.decode_payload()
    }

    fn decode_payload<T: serde::de::DeserializeOwned>(&self) -> CoreResult<T> {
        serde_json::from_value(self.payload.clone()).map_err(|e| CoreError::InvalidPayload {
            kind: self.kind.to_string(),
            message: e.to_string(),
        })
    }

    /// Check that the payload decodes for kinds that need one.
    pub fn validate(&self) -> CoreResult<()> {
        match self.kind {
            RuleKind::NamingTable
            | RuleKind::NamingColumn
            | RuleKind::NamingIndex
            | RuleKind::NamingUniqueKey
            | RuleKind::NamingForeignKey => {
                let payload = self.naming_payload()?;
                if payload.format.is_empty() {
                    return Err(CoreError::InvalidPayload {
                        kind: self.kind.to_string(),
                        message: "format must not be empty".to_string(),
                    });
                }
                Ok(())
            }
            RuleKind::ColumnRequired => self.required_column_payload().map(|_| ()),
            _ => Ok(()),
        }
    }
}

/// An ordered set of rule configurations for one environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Policy {
    #[serde(default)]
    pub row_status: RowStatus,

    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

impl Policy {
    pub fn new(rules: Vec<PolicyRule>) -> Self {
        Self {
            row_status: RowStatus::Normal,
            rules,
        }
    }

    /// A policy only takes effect when it is not archived and has rules.
    pub fn is_active(&self) -> bool {
        self.row_status == RowStatus::Normal && !self.rules.is_empty()
    }

    /// Rules that are not disabled, in declaration order.
    pub fn enabled_rules(&self) -> impl Iterator<Item = &PolicyRule> {
        self.rules.iter().filter(|r| r.level != RuleLevel::Disabled)
    }

    pub fn contains(&self, kind: RuleKind) -> bool {
        self.enabled_rules().any(|r| r.kind == kind)
    }

    pub fn validate(&self) -> CoreResult<()> {
        for rule in &self.rules {
            rule.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "policy_test.rs"]
mod tests;
