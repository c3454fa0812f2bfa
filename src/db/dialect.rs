use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dialect {
    PostgreSql,
    MySql,
    Sqlite,
    SqlServer,
}

impl Dialect {
    pub fn as_str(&self) -> &str {
        match self {
            Dialect::PostgreSql => "postgresql",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
            Dialect::SqlServer => "sqlserver",
        }
    }

    /// Schema read when none is configured.
    pub fn default_schema(&self) -> &'static str {
        match self {
            Dialect::SqlServer => "dbo",
            _ => "public",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pgsql" => Ok(Dialect::PostgreSql),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "sqlserver" | "sql server" | "mssql" => Ok(Dialect::SqlServer),
            "" => Err(ConfigError::MissingDbType),
            _ => Err(ConfigError::UnknownDbType(s.to_string())),
        }
    }
}
