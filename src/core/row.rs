use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use super::value::Value;

/// Identifier of a row within its table: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Index(i64),
    Key(String),
}

impl RowId {
    /// Reads a store key; canonical decimal keys are array indices
    ///
    /// A key only becomes an index when writing the index back yields the
    /// same key, so `"007"` stays a key.
    pub fn from_key(key: &str) -> Self {
        if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = key.parse::<i64>() {
                if index.to_string() == key {
                    return Self::Index(index);
                }
            }
        }
        Self::Key(key.to_string())
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Key(k) => write!(f, "{k}"),
        }
    }
}

impl From<&str> for RowId {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<i64> for RowId {
    fn from(index: i64) -> Self {
        Self::Index(index)
    }
}

/// A schemaless row: column name to scalar value.
///
/// Joined rows use `table.column` keys (see [`Row::namespaced`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    pub fields: BTreeMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absent columns read as NULL
    pub fn get(&self, column: &str) -> Value {
        self.fields.get(column).cloned().unwrap_or(Value::Null)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        self.fields.insert(column.into(), value);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    /// Copy of this row with every key prefixed by `table.`
    pub fn namespaced(&self, table: &str) -> Self {
        self.fields
            .iter()
            .map(|(column, value)| (format!("{table}.{column}"), value.clone()))
            .collect()
    }

    /// New row holding the fields of both rows; `other` wins on key clashes
    pub fn merged(&self, other: &Self) -> Self {
        let mut fields = self.fields.clone();
        fields.extend(other.fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self { fields }
    }

    /// Copy of this row with `patch` applied as a partial update
    pub fn patched(&self, patch: &Self) -> Self {
        self.merged(patch)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Row {
    fn from(object: serde_json::Map<String, serde_json::Value>) -> Self {
        object.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
    }
}

impl From<&Row> for serde_json::Value {
    fn from(row: &Row) -> Self {
        Self::Object(
            row.fields
                .iter()
                .map(|(k, v)| (k.clone(), Self::from(v)))
                .collect(),
        )
    }
}

/// Builds a [`Row`] from `column => value` pairs.
#[macro_export]
macro_rules! row {
    () => { $crate::core::Row::new() };
    ($($column:expr => $value:expr),+ $(,)?) => {{
        let mut row = $crate::core::Row::new();
        $( row.insert($column, $crate::core::Value::from($value)); )+
        row
    }};
}
