//! Migration intent and ledger record types.

use crate::error::CoreError;
use crate::namespace::Namespace;
use crate::version::is_semantic;
use serde::{Deserialize, Serialize};

macro_rules! string_enum {
    ($Name:ident, $what:literal, { $($Variant:ident => $s:literal),+ $(,)? }) => {
        impl $Name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($Name::$Variant => $s,)+
                }
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $Name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok($Name::$Variant),)+
                    _ => Err(CoreError::UnknownValue {
                        what: $what,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

/// Migration kind. Baseline and branch records reset the reference point
/// for forward-only version ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MigrationKind {
    Baseline,
    Branch,
    Migrate,
}

string_enum!(MigrationKind, "migration type", {
    Baseline => "BASELINE",
    Branch => "BRANCH",
    Migrate => "MIGRATE",
});

/// Ledger record status. `Pending` transitions to exactly one terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MigrationStatus {
    Pending,
    Done,
    Failed,
}

string_enum!(MigrationStatus, "migration status", {
    Pending => "PENDING",
    Done => "DONE",
    Failed => "FAILED",
});

impl MigrationStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, MigrationStatus::Pending)
    }
}

/// Where a migration request originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MigrationSource {
    #[default]
    Ui,
    Vcs,
    Library,
}

string_enum!(MigrationSource, "migration source", {
    Ui => "UI",
    Vcs => "VCS",
    Library => "LIBRARY",
});

/// The intent of one schema change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationInfo {
    pub namespace: Namespace,
    pub version: String,
    pub use_semantic_version: bool,
    #[serde(default)]
    pub semantic_version_suffix: String,
    #[serde(rename = "type")]
    pub kind: MigrationKind,
    #[serde(default)]
    pub source: MigrationSource,
    #[serde(default)]
    pub description: String,
    pub creator: String,
    #[serde(default)]
    pub release_version: String,
    #[serde(default)]
    pub issue_id: String,
    #[serde(default)]
    pub payload: String,
}

impl MigrationInfo {
    /// Build an intent; semantic encoding is chosen when `version` is a
    /// plain `MAJOR.MINOR.PATCH`.
    pub fn new(namespace: Namespace, version: impl Into<String>, kind: MigrationKind) -> Self {
        let version = version.into();
        Self {
            use_semantic_version: is_semantic(&version),
            namespace,
            version,
            semantic_version_suffix: String::new(),
            kind,
            source: MigrationSource::default(),
            description: String::new(),
            creator: "schemagate".to_string(),
            release_version: env!("CARGO_PKG_VERSION").to_string(),
            issue_id: String::new(),
            payload: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    pub fn with_source(mut self, source: MigrationSource) -> Self {
        self.source = source;
        self
    }
}

/// One ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationHistory {
    pub id: i64,
    pub created_by: String,
    pub created_ts: i64,
    pub updated_by: String,
    pub updated_ts: i64,
    pub release_version: String,
    pub namespace: Namespace,
    pub sequence: i64,
    pub source: MigrationSource,
    #[serde(rename = "type")]
    pub kind: MigrationKind,
    pub status: MigrationStatus,
    /// Decoded, user-facing version.
    pub version: String,
    pub use_semantic_version: bool,
    pub semantic_version_suffix: String,
    pub description: String,
    pub statement: String,
    pub schema: String,
    pub schema_prev: String,
    pub execution_duration_ns: i64,
    pub issue_id: String,
    pub payload: String,
}

/// Filter for history queries. Unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationHistoryFind {
    pub id: Option<i64>,
    pub namespace: Option<Namespace>,
    pub version: Option<String>,
    /// How `version` was stored. Guessed from its shape when unset.
    pub use_semantic_version: Option<bool>,
    pub source: Option<MigrationSource>,
    pub status: Option<MigrationStatus>,
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_strings() {
        assert_eq!(MigrationKind::Baseline.to_string(), "BASELINE");
        assert_eq!("BRANCH".parse::<MigrationKind>().unwrap(), MigrationKind::Branch);
        assert!("migrate".parse::<MigrationKind>().is_err());
    }

    #[test]
    fn test_status_terminal() {
        assert!(!MigrationStatus::Pending.is_terminal());
        assert!(MigrationStatus::Done.is_terminal());
        assert!(MigrationStatus::Failed.is_terminal());
        assert_eq!("FAILED".parse::<MigrationStatus>().unwrap(), MigrationStatus::Failed);
    }

    #[test]
    fn test_source_serde() {
        let json = serde_json::to_string(&MigrationSource::Library).unwrap();
        assert_eq!(json, r#""LIBRARY""#);
        assert_eq!("VCS".parse::<MigrationSource>().unwrap(), MigrationSource::Vcs);
    }

    #[test]
    fn test_info_detects_semantic_version() {
        let ns = Namespace::parse("app").unwrap();
        let info = MigrationInfo::new(ns.clone(), "1.0.2", MigrationKind::Migrate);
        assert!(info.use_semantic_version);

        let info = MigrationInfo::new(ns, "20220101120000", MigrationKind::Baseline)
            .with_creator("alice")
            .with_description("init");
        assert!(!info.use_semantic_version);
        assert_eq!(info.creator, "alice");
        assert_eq!(info.description, "init");
    }
}
