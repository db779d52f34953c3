use crate::error::SinkError;
use connectors::sql::base::adapter::SqlExecutor;
use std::future::Future;
use tracing::warn;

pub mod reconcile;

/// Runs `op` as one transaction: commit on success, roll back on failure.
///
/// A failed commit is rolled back as well, so a retried step starts from the
/// last durable state. A failed rollback is logged and swallowed so the
/// original error is the one reported.
pub async fn transact<F, Fut, T>(executor: &dyn SqlExecutor, op: F) -> Result<T, SinkError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, SinkError>>,
{
    let result = match op().await {
        Ok(value) => executor
            .commit()
            .await
            .map(|_| value)
            .map_err(SinkError::from),
        Err(err) => Err(err),
    };

    if result.is_err()
        && let Err(rollback) = executor.rollback().await
    {
        warn!(error = %rollback, "Rollback after failed transaction also failed");
    }
    result
}
