use thiserror::Error;

use crate::storage::StoreError;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("ORDER BY expects a column reference, got '{0}'")]
    UnorderableExpression(String),
    #[error("LIMIT requires both an offset and a count")]
    MalformedLimit,
    #[error("Table '{0}' follows another source without a JOIN clause")]
    MissingJoinClause(String),
    #[error("Column count mismatch: expected {expected} values, found {found}")]
    ColumnCountMismatch { expected: usize, found: usize },
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Store task failed: {0}")]
    TaskFailed(String),
    #[error("Connection closed before authentication completed")]
    ConnectionClosed,
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
