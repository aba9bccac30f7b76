use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The engine-side type a column is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Boolean,
    /// 64-bit signed integer.
    Bigint,
    Double,
    Varchar,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Boolean => "boolean",
            ColumnType::Bigint => "bigint",
            ColumnType::Double => "double",
            ColumnType::Varchar => "varchar",
        };
        f.write_str(name)
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Ok(ColumnType::Boolean),
            "bigint" | "long" => Ok(ColumnType::Bigint),
            "double" => Ok(ColumnType::Double),
            "varchar" | "text" | "string" => Ok(ColumnType::Varchar),
            other => Err(format!("unknown column type: {other}")),
        }
    }
}

/// One output column: its name, the document path it reads, and its type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnHandle {
    pub name: String,
    pub path: String,
    pub column_type: ColumnType,
}

impl ColumnHandle {
    pub fn new(name: impl Into<String>, path: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            column_type,
        }
    }
}

/// Where a logical table lives. `host` and `port` are informational only;
/// the backend handle is resolved from `cluster` by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSource {
    pub cluster: String,
    pub host: String,
    pub port: u16,
    pub index: String,
    pub doc_type: String,
}
