/// DML (Data Manipulation Language) operations
///
/// INSERT, UPDATE, DELETE translated into per-row store calls. UPDATE and
/// DELETE fetch the whole table and filter in memory first. All calls of one
/// statement run concurrently; see [`fan_out`] for the failure policy.

use std::sync::Arc;

use tracing::debug;

use super::conditions::ConditionEvaluator;
use super::fanout::fan_out;
use crate::parser::{Delete, Expr, Insert, Update};
use crate::storage::Store;
use crate::types::{DatabaseError, Row, RowId};

pub struct DmlExecutor;

impl DmlExecutor {
    /// Append one row per value tuple; ids follow the tuple order
    pub async fn insert(store: &Arc<dyn Store>, insert: &Insert) -> Result<Vec<RowId>, DatabaseError> {
        // Arity is checked up front so a bad tuple never leaves a partial insert
        for values in &insert.rows {
            if values.len() != insert.columns.len() {
                return Err(DatabaseError::ColumnCountMismatch {
                    expected: insert.columns.len(),
                    found: values.len(),
                });
            }
        }

        let calls: Vec<_> = insert
            .rows
            .iter()
            .map(|values| {
                let row: Row = insert.columns.iter().cloned().zip(values.iter().cloned()).collect();
                let store = Arc::clone(store);
                let table = insert.table.clone();
                async move { store.append(&table, row).await }
            })
            .collect();

        debug!(table = %insert.table, rows = calls.len(), "insert");
        fan_out(calls).await
    }

    /// Apply the assignments as a partial update to every matching row
    pub async fn update(store: &Arc<dyn Store>, update: &Update) -> Result<Vec<RowId>, DatabaseError> {
        let ids = Self::matching_ids(store, &update.table, update.predicate.as_ref()).await?;
        let patch: Row = update.assignments.iter().cloned().collect();

        let calls: Vec<_> = ids
            .iter()
            .map(|id| {
                let store = Arc::clone(store);
                let table = update.table.clone();
                let id = id.clone();
                let patch = patch.clone();
                async move { store.merge_at(&table, &id, patch).await }
            })
            .collect();

        debug!(table = %update.table, rows = ids.len(), "update");
        fan_out(calls).await?;
        Ok(ids)
    }

    /// Remove every matching row
    pub async fn delete(store: &Arc<dyn Store>, delete: &Delete) -> Result<Vec<RowId>, DatabaseError> {
        let ids = Self::matching_ids(store, &delete.table, delete.predicate.as_ref()).await?;

        let calls: Vec<_> = ids
            .iter()
            .map(|id| {
                let store = Arc::clone(store);
                let table = delete.table.clone();
                let id = id.clone();
                async move { store.remove_at(&table, &id).await }
            })
            .collect();

        debug!(table = %delete.table, rows = ids.len(), "delete");
        fan_out(calls).await?;
        Ok(ids)
    }

    async fn matching_ids(
        store: &Arc<dyn Store>,
        table: &str,
        predicate: Option<&Expr>,
    ) -> Result<Vec<RowId>, DatabaseError> {
        let rows = store.fetch_all(table).await?;
        Ok(rows
            .into_iter()
            .filter(|(_, row)| ConditionEvaluator::evaluate(predicate, row, false))
            .map(|(id, _)| id)
            .collect())
    }
}
