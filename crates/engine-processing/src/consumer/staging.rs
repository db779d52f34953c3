use connectors::sql::{base::adapter::SqlExecutor, mssql::temp_table::TempTable};
use engine_core::{connectors::sink::transact, error::SinkError};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{error, info, warn};

/// # RAII Guard for the Staging Table
/// Acquiring drops any leftover staging table and creates a fresh one.
/// Releasing drops it again; if the guard goes out of scope unreleased the
/// drop is spawned on the current runtime.
///
/// Neither step is retried. At setup nothing durable exists yet, and at
/// teardown the session outcome is already decided.
pub struct StagingGuard {
    executor: Arc<dyn SqlExecutor>,
    staging: TempTable,
    released: bool,
}

impl StagingGuard {
    pub async fn acquire(
        executor: Arc<dyn SqlExecutor>,
        staging: TempTable,
    ) -> Result<Self, SinkError> {
        let table = staging.clone();
        transact(executor.as_ref(), || async move {
            table.drop().await?;
            table.create().await?;
            Ok::<_, SinkError>(())
        })
        .await?;

        info!(table = %staging.table(), "Staging table ready");
        Ok(Self {
            executor,
            staging,
            released: false,
        })
    }

    pub fn staging(&self) -> &TempTable {
        &self.staging
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Drops the staging table in its own transaction. Failures are logged,
    /// not returned. Calling it twice is a no-op.
    pub async fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match drop_staging(self.executor.clone(), self.staging.clone()).await {
            Ok(()) => info!(table = %self.staging.table(), "Staging table dropped"),
            Err(e) => warn!(
                table = %self.staging.table(),
                error = %e,
                "Failed to drop staging table"
            ),
        }
    }
}

async fn drop_staging(executor: Arc<dyn SqlExecutor>, staging: TempTable) -> Result<(), SinkError> {
    transact(executor.as_ref(), || async move {
        staging.drop().await?;
        Ok::<_, SinkError>(())
    })
    .await
}

impl Drop for StagingGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let table = self.staging.table().clone();
        // `drop` cannot be async; the cleanup needs a runtime to run on.
        let Ok(handle) = Handle::try_current() else {
            error!(table = %table, "No runtime left to drop staging table");
            return;
        };

        warn!(table = %table, "Staging table released on drop");
        let executor = self.executor.clone();
        let staging = self.staging.clone();
        handle.spawn(async move {
            if let Err(e) = drop_staging(executor, staging).await {
                error!(table = %table, error = %e, "Failed to drop staging table.");
            }
        });
    }
}

impl std::fmt::Debug for StagingGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagingGuard")
            .field("staging", &self.staging)
            .field("released", &self.released)
            .finish()
    }
}
