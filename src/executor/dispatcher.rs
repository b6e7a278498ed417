use std::sync::Arc;

use tracing::debug;

use super::dml::DmlExecutor;
use super::fanout::fan_out;
use super::join::{JoinInput, JoinPlanner};
use super::queries::SelectExecutor;
use crate::parser::{Select, Statement};
use crate::storage::Store;
use crate::types::{DatabaseError, Row, RowId};

pub struct QueryExecutor;

#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Output rows of a SELECT
    Rows(Vec<Row>),
    /// Identifiers touched by INSERT/UPDATE/DELETE
    Ids(Vec<RowId>),
    Success(String),
    /// Statement handed back unexecuted
    Statement(Statement),
}

impl QueryExecutor {
    /// Routes a parsed statement to its executor
    ///
    /// Readiness gating lives in [`crate::Connection`]; this assumes an
    /// authenticated store.
    pub async fn execute(store: &Arc<dyn Store>, stmt: Statement) -> Result<QueryResult, DatabaseError> {
        debug!(kind = stmt.kind(), "execute");
        match stmt {
            Statement::Select(select) => Self::select(store, &select).await.map(QueryResult::Rows),
            Statement::Insert(insert) => DmlExecutor::insert(store, &insert).await.map(QueryResult::Ids),
            Statement::Update(update) => DmlExecutor::update(store, &update).await.map(QueryResult::Ids),
            Statement::Delete(delete) => DmlExecutor::delete(store, &delete).await.map(QueryResult::Ids),
            // Tables exist as soon as a row is written
            Statement::CreateTable { name } => Ok(QueryResult::Success(format!("CREATE TABLE {name}"))),
            Statement::DropTable { name } => {
                store.remove_all(&name).await?;
                Ok(QueryResult::Success(format!("DROP TABLE {name}")))
            }
            other @ Statement::Other { .. } => Ok(QueryResult::Statement(other)),
        }
    }

    async fn select(store: &Arc<dyn Store>, select: &Select) -> Result<Vec<Row>, DatabaseError> {
        let calls: Vec<_> = select
            .sources
            .iter()
            .map(|source| {
                let store = Arc::clone(store);
                let table = source.table.clone();
                async move { store.fetch_all(&table).await }
            })
            .collect();
        let mut fetched = fan_out(calls).await?;

        if select.sources.len() == 1 {
            let rows = fetched.pop().map(|rows| rows.into_values().collect()).unwrap_or_default();
            return SelectExecutor::select(select, rows, false);
        }

        let inputs = select
            .sources
            .iter()
            .zip(fetched)
            .map(|(source, rows)| JoinInput {
                table: source.table.clone(),
                join: source.join,
                condition: source.condition.clone(),
                rows: rows.into_values().collect(),
            })
            .collect();
        let joined = JoinPlanner::plan(inputs)?;
        SelectExecutor::select(select, joined, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_statement;
    use crate::row;
    use crate::storage::MemoryStore;

    fn store() -> Arc<dyn Store> {
        Arc::new(
            MemoryStore::new("")
                .with_table(
                    "states",
                    vec![
                        (RowId::Index(0), row! { "id" => 1, "State" => "Ohio", "Population" => 11_780_017 }),
                        (RowId::Index(1), row! { "id" => 2, "State" => "Utah", "Population" => 3_271_616 }),
                    ],
                )
                .with_table(
                    "capitals",
                    vec![(RowId::Index(0), row! { "state_id" => 1, "Capital" => "Columbus" })],
                ),
        )
    }

    async fn run(store: &Arc<dyn Store>, sql: &str) -> QueryResult {
        QueryExecutor::execute(store, parse_statement(sql).unwrap()).await.unwrap()
    }

    #[tokio::test]
    async fn test_single_table_select_is_not_namespaced() {
        let store = store();
        let QueryResult::Rows(rows) = run(&store, "SELECT State FROM states WHERE id = 2").await else {
            panic!("Expected rows");
        };
        assert_eq!(rows, vec![row! { "State" => "Utah" }]);
    }

    #[tokio::test]
    async fn test_join_select_is_namespaced() {
        let store = store();
        let result = run(
            &store,
            "SELECT states.State, capitals.Capital FROM states \
             INNER JOIN capitals ON states.id = capitals.state_id",
        )
        .await;
        assert_eq!(
            result,
            QueryResult::Rows(vec![row! { "states.State" => "Ohio", "capitals.Capital" => "Columbus" }])
        );
    }

    #[tokio::test]
    async fn test_sum_over_table() {
        let store = store();
        let result = run(&store, "SELECT SUM(Population) FROM states").await;
        assert_eq!(
            result,
            QueryResult::Rows(vec![row! { "SUM(Population)" => 15_051_633 }])
        );
    }

    #[tokio::test]
    async fn test_comma_join_without_clause_is_rejected() {
        let store = store();
        let err = QueryExecutor::execute(&store, parse_statement("SELECT * FROM states, capitals").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::MissingJoinClause(_)));
    }

    #[tokio::test]
    async fn test_create_and_drop_table() {
        let store = store();
        assert!(matches!(run(&store, "CREATE TABLE t (a INT)").await, QueryResult::Success(_)));
        run(&store, "DROP TABLE capitals").await;
        assert_eq!(run(&store, "SELECT * FROM capitals").await, QueryResult::Rows(Vec::new()));
    }

    #[tokio::test]
    async fn test_unknown_statement_passes_through() {
        let store = store();
        let stmt = parse_statement("BEGIN").unwrap();
        let result = QueryExecutor::execute(&store, stmt.clone()).await.unwrap();
        assert_eq!(result, QueryResult::Statement(stmt));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = store();
        store.disconnect().await.unwrap();
        let err = QueryExecutor::execute(&store, parse_statement("SELECT * FROM states").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Store(_)));
    }
}
