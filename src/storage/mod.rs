/// Store collaborator - the remote hierarchical key-value backend
///
/// Tables are child collections under a root path; each row is a child of
/// its table, keyed by a store-assigned or caller-provided identifier.
/// The engine never talks to a backend directly, only through [`Store`].

mod memory;

pub use memory::MemoryStore;

use crate::types::{Row, RowId};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store is offline")]
    Offline,
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("path '{0}' not found")]
    NotFound(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Email/password pair submitted whenever the auth stream reports signed-out
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// All rows of one table, ordered by identifier
pub type TableRows = BTreeMap<RowId, Row>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Every current row of `table`; a missing table is empty
    async fn fetch_all(&self, table: &str) -> Result<TableRows, StoreError>;

    /// Replace the full content of a row
    async fn write_at(&self, table: &str, id: &RowId, row: Row) -> Result<(), StoreError>;

    /// Apply a partial update to a row
    async fn merge_at(&self, table: &str, id: &RowId, partial: Row) -> Result<(), StoreError>;

    /// Create a row under a store-assigned identifier
    async fn append(&self, table: &str, row: Row) -> Result<RowId, StoreError>;

    async fn remove_at(&self, table: &str, id: &RowId) -> Result<(), StoreError>;

    async fn remove_all(&self, table: &str) -> Result<(), StoreError>;

    /// Authentication state stream; `true` once signed in
    fn auth_state_changes(&self) -> watch::Receiver<bool>;

    /// Submit credentials; success is reported through [`Store::auth_state_changes`]
    async fn authenticate(&self, credentials: &Credentials) -> Result<(), StoreError>;

    async fn disconnect(&self) -> Result<(), StoreError>;
}
