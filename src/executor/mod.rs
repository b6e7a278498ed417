/// Executor module - evaluates parsed statements against a store
///
/// Structure:
/// - conditions: WHERE / ON predicate evaluation
/// - like: LIKE pattern compilation
/// - join: nested-loop JOIN over fetched tables
/// - projection: column lists, GROUP BY and aggregates
/// - queries: SELECT pipeline over one row set
/// - dml: INSERT/UPDATE/DELETE as per-row store calls
/// - fanout: concurrent store calls with a fan-in barrier
/// - dispatcher: routing by statement kind

pub mod conditions;
pub mod like;
pub mod join;
pub mod projection;
pub mod queries;
pub mod dml;
pub mod fanout;
pub mod dispatcher;

pub use conditions::ConditionEvaluator;
pub use like::LikeMatcher;
pub use join::{JoinInput, JoinPlanner};
pub use projection::RowProjector;
pub use queries::SelectExecutor;
pub use dml::DmlExecutor;
pub use dispatcher::{QueryExecutor, QueryResult};
