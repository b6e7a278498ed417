/// Concurrent fan-out / fan-in of store calls
///
/// Each call runs as its own task. All tasks are drained before returning,
/// so a failure never cancels siblings already in flight and nothing is
/// rolled back. The first failure observed wins.

use std::future::Future;

use tokio::task::JoinSet;
use tracing::debug;

use crate::storage::StoreError;
use crate::types::DatabaseError;

/// Run `calls` concurrently; results keep the order of `calls`
pub async fn fan_out<T, F>(calls: Vec<F>) -> Result<Vec<T>, DatabaseError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, StoreError>> + Send + 'static,
{
    let total = calls.len();
    let mut tasks = JoinSet::new();
    for (index, call) in calls.into_iter().enumerate() {
        tasks.spawn(async move { (index, call.await) });
    }

    let mut results: Vec<Option<T>> = std::iter::repeat_with(|| None).take(total).collect();
    let mut first_error: Option<DatabaseError> = None;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(value))) => results[index] = Some(value),
            Ok((index, Err(e))) => {
                debug!(index, error = %e, "store call failed");
                first_error.get_or_insert(DatabaseError::Store(e));
            }
            Err(e) => {
                first_error.get_or_insert(DatabaseError::TaskFailed(e.to_string()));
            }
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }

    results
        .into_iter()
        .collect::<Option<Vec<T>>>()
        .ok_or_else(|| DatabaseError::TaskFailed("store call produced no result".to_string()))
}
