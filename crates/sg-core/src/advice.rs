//! Advisor findings
//!
//! An [`Advice`] is the unit of output of every rule: a status, a stable
//! numeric code, a title and free-text content. The wire shape is
//! `{status, code, title, content}` with `code` serialized as an integer.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Advice severity, ordered `Success < Warn < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdviceStatus {
    Success,
    Warn,
    Error,
}

impl std::fmt::Display for AdviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdviceStatus::Success => write!(f, "SUCCESS"),
            AdviceStatus::Warn => write!(f, "WARN"),
            AdviceStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Stable advice codes. The numeric values are part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum AdviceCode {
    Ok = 0,
    Internal = 1,
    NotFound = 2,
    Unsupported = 3,

    CompatibilityDropDatabase = 101,
    CompatibilityRenameTable = 102,
    CompatibilityDropTable = 103,
    CompatibilityRenameColumn = 104,
    CompatibilityDropColumn = 105,
    CompatibilityAddPrimaryKey = 106,
    CompatibilityAddUniqueKey = 107,
    CompatibilityAddForeignKey = 108,
    CompatibilityAddCheck = 109,
    CompatibilityAlterCheck = 110,
    CompatibilityAlterColumn = 111,

    StatementSyntaxError = 201,
    StatementNoWhere = 202,
    StatementSelectAll = 203,
    StatementLeadingWildcardLike = 204,

    NamingTableConventionMismatch = 301,
    NamingColumnConventionMismatch = 302,
    NamingIndexConventionMismatch = 303,
    NamingUniqueKeyConventionMismatch = 304,
    NamingForeignKeyConventionMismatch = 305,

    NoRequiredColumn = 401,
    ColumnCanNotNull = 402,

    NotInnoDBEngine = 501,

    TableNoPK = 601,
}

impl AdviceCode {
    const ALL: [AdviceCode; 28] = [
        AdviceCode::Ok,
        AdviceCode::Internal,
        AdviceCode::NotFound,
        AdviceCode::Unsupported,
        AdviceCode::CompatibilityDropDatabase,
        AdviceCode::CompatibilityRenameTable,
        AdviceCode::CompatibilityDropTable,
        AdviceCode::CompatibilityRenameColumn,
        AdviceCode::CompatibilityDropColumn,
        AdviceCode::CompatibilityAddPrimaryKey,
        AdviceCode::CompatibilityAddUniqueKey,
        AdviceCode::CompatibilityAddForeignKey,
        AdviceCode::CompatibilityAddCheck,
        AdviceCode::CompatibilityAlterCheck,
        AdviceCode::CompatibilityAlterColumn,
        AdviceCode::StatementSyntaxError,
        AdviceCode::StatementNoWhere,
        AdviceCode::StatementSelectAll,
        AdviceCode::StatementLeadingWildcardLike,
        AdviceCode::NamingTableConventionMismatch,
        AdviceCode::NamingColumnConventionMismatch,
        AdviceCode::NamingIndexConventionMismatch,
        AdviceCode::NamingUniqueKeyConventionMismatch,
        AdviceCode::NamingForeignKeyConventionMismatch,
        AdviceCode::NoRequiredColumn,
        AdviceCode::ColumnCanNotNull,
        AdviceCode::NotInnoDBEngine,
        AdviceCode::TableNoPK,
    ];

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|code| code.as_i32() == value)
    }
}

impl std::fmt::Display for AdviceCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}

impl Serialize for AdviceCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.as_i32())
    }
}

impl<'de> Deserialize<'de> for AdviceCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i32::deserialize(deserializer)?;
        AdviceCode::from_i32(value)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown advice code {value}")))
    }
}

/// Title used for every syntax-error advice.
pub const SYNTAX_ERROR_TITLE: &str = "Syntax Error";

/// One rule finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub status: AdviceStatus,
    pub code: AdviceCode,
    pub title: String,
    pub content: String,
}

impl Advice {
    pub fn new(
        status: AdviceStatus,
        code: AdviceCode,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            status,
            code,
            title: title.into(),
            content: content.into(),
        }
    }

    /// The single advice a rule emits when it finds nothing.
    pub fn ok() -> Self {
        Self::new(AdviceStatus::Success, AdviceCode::Ok, "OK", "")
    }

    /// Error advice for a statement that failed to parse.
    pub fn syntax_error(message: impl Into<String>) -> Self {
        Self::new(
            AdviceStatus::Error,
            AdviceCode::StatementSyntaxError,
            SYNTAX_ERROR_TITLE,
            message,
        )
    }

    pub fn is_ok(&self) -> bool {
        self.status == AdviceStatus::Success && self.code == AdviceCode::Ok
    }
}
