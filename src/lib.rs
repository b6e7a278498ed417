// rtdbsql - SQL over a schemaless hierarchical key-value store
// Rows are fetched whole; filtering, joins, aggregates and ordering run in memory

// Clippy configuration - allow non-critical warnings
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]

// Core data model (values, rows, errors)
pub mod core;

// Backward compatibility - re-export all core types as types module
pub mod types {
    pub use crate::core::*;
}

// SQL parser (SELECT with joins, DML, table DDL, pass-through verbs)
pub mod parser;

// Query executor (predicates, joins, projection, mutations)
pub mod executor;

// Store collaborator trait and the in-memory JSON store
pub mod storage;

// Connection lifecycle and auth gate
pub mod connection;

pub mod config;
pub mod logging;

// Re-export commonly used types for convenience
pub use crate::core::{DatabaseError, Row, RowId, Value};
pub use parser::{parse_statement, Statement};
pub use executor::{QueryExecutor, QueryResult};
pub use storage::{Credentials, MemoryStore, Store, StoreError};
pub use connection::{Connection, SessionState};
pub use crate::config::ConnectionConfig;
pub use logging::LogConfig;
