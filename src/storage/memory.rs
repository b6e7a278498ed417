/// In-process store over a JSON document tree
///
/// Mirrors the layout of a hosted realtime tree: `<root>/<table>/<id>` with
/// each row an object of scalar fields. Used by the CLI and the test suite.

use super::{Credentials, Store, StoreError, TableRows};
use crate::types::{DatabaseError, Row, RowId};
use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::{watch, RwLock};
use tracing::{debug, trace};

struct State {
    tables: BTreeMap<String, TableRows>,
    /// Document the tables were loaded from; other branches survive a save
    document: JsonValue,
    /// `table` or `table/id` paths that reject writes
    denied: HashSet<String>,
    online: bool,
    next_key: u64,
}

pub struct MemoryStore {
    root: Vec<String>,
    state: RwLock<State>,
    auth: watch::Sender<bool>,
    required: Option<Credentials>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("")
    }
}

impl MemoryStore {
    /// Empty store with tables under `root` ("" for the document root)
    pub fn new(root: &str) -> Self {
        let (auth, _) = watch::channel(false);
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64);

        Self {
            root: split_path(root),
            state: RwLock::new(State {
                tables: BTreeMap::new(),
                document: JsonValue::Object(Map::new()),
                denied: HashSet::new(),
                online: true,
                next_key: seed << 12,
            }),
            auth,
            required: None,
        }
    }

    /// Load the tables found under `root` in a JSON document
    pub fn from_json(root: &str, document: JsonValue) -> Self {
        let mut store = Self::new(root);
        let tables = tables_at(&document, &store.root);
        debug!(tables = tables.len(), root, "Loaded store document");

        let state = store.state.get_mut();
        state.tables = tables;
        state.document = document;
        store
    }

    pub fn from_file(root: &str, path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let text = std::fs::read_to_string(path)?;
        let document: JsonValue = serde_json::from_str(&text)?;
        Ok(Self::from_json(root, document))
    }

    /// Only accept these credentials in [`Store::authenticate`]
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.required = Some(credentials);
        self
    }

    /// Seed a table with rows
    #[must_use]
    pub fn with_table<I>(mut self, table: &str, rows: I) -> Self
    where
        I: IntoIterator<Item = (RowId, Row)>,
    {
        self.state
            .get_mut()
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(rows);
        self
    }

    /// Simulate an authentication event coming from outside the driver
    pub fn set_authenticated(&self, authenticated: bool) {
        self.auth.send_replace(authenticated);
    }

    /// Reject every write to `table`, or to one row when `id` is given
    pub async fn deny(&self, table: &str, id: Option<&RowId>) {
        let path = match id {
            Some(id) => format!("{table}/{id}"),
            None => table.to_string(),
        };
        self.state.write().await.denied.insert(path);
    }

    /// Rows of a table as currently stored, bypassing online/auth checks
    pub async fn rows(&self, table: &str) -> TableRows {
        self.state.read().await.tables.get(table).cloned().unwrap_or_default()
    }

    /// The full document with the current tables grafted under the root
    pub async fn snapshot(&self) -> JsonValue {
        let state = self.state.read().await;
        let mut document = state.document.clone();
        let tables = JsonValue::Object(
            state
                .tables
                .iter()
                .map(|(name, rows)| (name.clone(), table_to_json(rows)))
                .collect(),
        );
        graft(&mut document, &self.root, tables);
        document
    }

    pub async fn save_to(&self, path: impl AsRef<Path>) -> Result<(), DatabaseError> {
        let document = self.snapshot().await;
        std::fs::write(path, serde_json::to_string_pretty(&document)?)?;
        Ok(())
    }

    fn check_writable(state: &State, table: &str, id: Option<&RowId>) -> Result<(), StoreError> {
        if !state.online {
            return Err(StoreError::Offline);
        }
        if state.denied.contains(table) {
            return Err(StoreError::PermissionDenied(table.to_string()));
        }
        if let Some(id) = id {
            let path = format!("{table}/{id}");
            if state.denied.contains(&path) {
                return Err(StoreError::PermissionDenied(path));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn fetch_all(&self, table: &str) -> Result<TableRows, StoreError> {
        let state = self.state.read().await;
        if !state.online {
            return Err(StoreError::Offline);
        }
        let rows = state.tables.get(table).cloned().unwrap_or_default();
        trace!(table, rows = rows.len(), "fetch_all");
        Ok(rows)
    }

    async fn write_at(&self, table: &str, id: &RowId, row: Row) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        Self::check_writable(&state, table, Some(id))?;
        state.tables.entry(table.to_string()).or_default().insert(id.clone(), row);
        Ok(())
    }

    async fn merge_at(&self, table: &str, id: &RowId, partial: Row) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        Self::check_writable(&state, table, Some(id))?;
        let rows = state.tables.entry(table.to_string()).or_default();
        let updated = rows.get(id).map_or_else(|| partial.clone(), |row| row.patched(&partial));
        rows.insert(id.clone(), updated);
        Ok(())
    }

    async fn append(&self, table: &str, row: Row) -> Result<RowId, StoreError> {
        let mut state = self.state.write().await;
        Self::check_writable(&state, table, None)?;

        let id = loop {
            let candidate = RowId::Key(format!("-{:016x}", state.next_key));
            state.next_key += 1;
            let taken = state
                .tables
                .get(table)
                .is_some_and(|rows| rows.contains_key(&candidate));
            if !taken {
                break candidate;
            }
        };

        state.tables.entry(table.to_string()).or_default().insert(id.clone(), row);
        trace!(table, %id, "append");
        Ok(id)
    }

    async fn remove_at(&self, table: &str, id: &RowId) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        Self::check_writable(&state, table, Some(id))?;
        if let Some(rows) = state.tables.get_mut(table) {
            rows.remove(id);
        }
        Ok(())
    }

    async fn remove_all(&self, table: &str) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        Self::check_writable(&state, table, None)?;
        state.tables.remove(table);
        Ok(())
    }

    fn auth_state_changes(&self) -> watch::Receiver<bool> {
        self.auth.subscribe()
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<(), StoreError> {
        if !self.state.read().await.online {
            return Err(StoreError::Offline);
        }
        if let Some(required) = &self.required {
            if required != credentials {
                return Err(StoreError::PermissionDenied(format!(
                    "invalid credentials for '{}'",
                    credentials.email
                )));
            }
        }
        self.auth.send_replace(true);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), StoreError> {
        self.state.write().await.online = false;
        debug!("Store offline");
        Ok(())
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

fn tables_at(document: &JsonValue, root: &[String]) -> BTreeMap<String, TableRows> {
    let mut node = document;
    for segment in root {
        match node.get(segment) {
            Some(child) => node = child,
            None => return BTreeMap::new(),
        }
    }

    let JsonValue::Object(children) = node else {
        return BTreeMap::new();
    };

    children
        .iter()
        .map(|(name, table)| (name.clone(), table_from_json(table)))
        .collect()
}

fn table_from_json(table: &JsonValue) -> TableRows {
    let entries: Vec<(RowId, &JsonValue)> = match table {
        JsonValue::Object(rows) => rows.iter().map(|(key, row)| (RowId::from_key(key), row)).collect(),
        // Arrays come back from the store as index-keyed children; holes are null
        JsonValue::Array(rows) => rows
            .iter()
            .enumerate()
            .map(|(index, row)| (RowId::Index(index as i64), row))
            .collect(),
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(|(id, row)| match row {
            JsonValue::Object(fields) => Some((id, Row::from(fields.clone()))),
            _ => None,
        })
        .collect()
}

fn table_to_json(rows: &TableRows) -> JsonValue {
    JsonValue::Object(
        rows.iter()
            .map(|(id, row)| (id.to_string(), JsonValue::from(row)))
            .collect(),
    )
}

fn graft(node: &mut JsonValue, path: &[String], subtree: JsonValue) {
    match path.split_first() {
        None => *node = subtree,
        Some((head, rest)) => {
            if !node.is_object() {
                *node = JsonValue::Object(Map::new());
            }
            if let JsonValue::Object(children) = node {
                let child = children.entry(head.clone()).or_insert(JsonValue::Null);
                graft(child, rest, subtree);
            }
        }
    }
}
