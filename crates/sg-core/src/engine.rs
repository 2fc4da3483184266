//! Database engine selector

use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// Target database engine.
///
/// Rules are registered per engine; TiDB shares the MySQL grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    MySql,
    TiDb,
    Postgres,
    #[default]
    Sqlite,
}

impl Engine {
    /// All engines, in registration order.
    pub const ALL: [Engine; 4] = [Engine::MySql, Engine::TiDb, Engine::Postgres, Engine::Sqlite];

    pub fn as_str(self) -> &'static str {
        match self {
            Engine::MySql => "mysql",
            Engine::TiDb => "tidb",
            Engine::Postgres => "postgres",
            Engine::Sqlite => "sqlite",
        }
    }

    /// Whether the engine speaks the MySQL grammar.
    pub fn is_mysql_family(self) -> bool {
        matches!(self, Engine::MySql | Engine::TiDb)
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Engine {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" => Ok(Engine::MySql),
            "tidb" => Ok(Engine::TiDb),
            "postgres" | "postgresql" | "pg" => Ok(Engine::Postgres),
            "sqlite" => Ok(Engine::Sqlite),
            _ => Err(CoreError::UnknownValue {
                what: "engine",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_aliases() {
        assert_eq!("PostgreSQL".parse::<Engine>().unwrap(), Engine::Postgres);
        assert_eq!("pg".parse::<Engine>().unwrap(), Engine::Postgres);
        assert_eq!("tidb".parse::<Engine>().unwrap(), Engine::TiDb);
        assert!("oracle".parse::<Engine>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let engine: Engine = serde_yaml::from_str("mysql").unwrap();
        assert_eq!(engine, Engine::MySql);
        assert_eq!(serde_json::to_string(&Engine::TiDb).unwrap(), r#""tidb""#);
    }

    #[test]
    fn test_mysql_family() {
        assert!(Engine::MySql.is_mysql_family());
        assert!(Engine::TiDb.is_mysql_family());
        assert!(!Engine::Postgres.is_mysql_family());
    }
}
