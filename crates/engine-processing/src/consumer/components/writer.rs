use crate::{consumer::staging::StagingGuard, retry::classify_sink_error};
use connectors::sql::{
    base::{adapter::SqlExecutor, destination::Destination},
    mssql::temp_table::TempTable,
};
use engine_core::{
    connectors::sink::{reconcile::Reconciler, transact},
    error::SinkError,
    retry::RetryPolicy,
};
use model::{
    core::value::Value,
    execution::mode::{UpsertMode, WriteMode},
    records::row::Row,
};
use std::{sync::Arc, time::Instant};
use tracing::{debug, info, trace};

#[derive(Debug, Clone)]
pub struct WriteResult {
    pub rows_written: u64,
    pub duration: std::time::Duration,
}

/// Write surface for one destination table: rows land in staging with
/// [`ingest`](TableWriter::ingest) and are made durable by
/// [`replace`](TableWriter::replace) or [`append`](TableWriter::append).
///
/// Ingest and persist steps each run as one transaction under the retry
/// policy. Staging setup and teardown are not retried.
pub struct TableWriter {
    executor: Arc<dyn SqlExecutor>,
    reconciler: Reconciler,
    staging: StagingGuard,
    mode: WriteMode,
    retry: RetryPolicy,
}

impl TableWriter {
    /// Checks the create-mode precondition, then sets up a fresh staging
    /// table.
    pub async fn start(
        executor: Arc<dyn SqlExecutor>,
        destination: Arc<Destination>,
        mode: WriteMode,
        retry: RetryPolicy,
        staging_prefix: &str,
    ) -> Result<Self, SinkError> {
        let staging = TempTable::new(executor.clone(), destination.clone(), staging_prefix);
        let reconciler = Reconciler::new(executor.clone(), staging.clone());

        if mode == WriteMode::Create {
            transact(executor.as_ref(), || reconciler.verify_absent()).await?;
        }

        let staging = StagingGuard::acquire(executor.clone(), staging).await?;
        info!(
            table = %destination.table,
            staging = %staging.staging().table(),
            %mode,
            "Write session started"
        );

        Ok(Self {
            executor,
            reconciler,
            staging,
            mode,
            retry,
        })
    }

    pub fn destination(&self) -> &Destination {
        self.reconciler.destination()
    }

    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Lands a batch in staging and commits it.
    pub async fn ingest(&self, rows: &[Row]) -> Result<WriteResult, SinkError> {
        let start = Instant::now();
        if rows.is_empty() {
            return Ok(WriteResult {
                rows_written: 0,
                duration: start.elapsed(),
            });
        }

        let rows_written = self
            .retry
            .run(
                || {
                    transact(self.executor.as_ref(), || async move {
                        Ok::<_, SinkError>(self.reconciler.staging().ingest(rows).await?)
                    })
                },
                classify_sink_error,
            )
            .await
            .map_err(|e| SinkError::from_retry("ingest", e))?;

        let duration = start.elapsed();
        debug!(
            table = %self.reconciler.staging().table(),
            rows = rows_written,
            duration_ms = duration.as_millis(),
            "Batch staged"
        );

        Ok(WriteResult {
            rows_written,
            duration,
        })
    }

    /// Persists staging with the session's write mode.
    pub async fn replace(&self) -> Result<(), SinkError> {
        self.persist(UpsertMode::Replace, &[]).await
    }

    /// Persists staging by merging it into the destination on the id column.
    pub async fn append(&self) -> Result<(), SinkError> {
        self.persist(UpsertMode::Append, &[]).await
    }

    /// Applies `deletes` and persists staging for the given phase, as one
    /// retried transaction.
    ///
    /// In the replace phase deletes only matter in append mode; the other
    /// modes start the destination over.
    pub async fn persist(&self, phase: UpsertMode, deletes: &[Value]) -> Result<(), SinkError> {
        let start = Instant::now();
        let deletes: &[Value] = match phase {
            UpsertMode::Replace if self.mode != WriteMode::Append => {
                if !deletes.is_empty() {
                    trace!(
                        keys = deletes.len(),
                        mode = %self.mode,
                        "Discarding deletes, destination is rebuilt"
                    );
                }
                &[]
            }
            _ => deletes,
        };

        self.retry
            .run(
                || transact(self.executor.as_ref(), || self.persist_once(phase, deletes)),
                classify_sink_error,
            )
            .await
            .map_err(|e| SinkError::from_retry("commit", e))?;

        info!(
            table = %self.destination().table,
            phase = ?phase,
            deletes = deletes.len(),
            duration_ms = start.elapsed().as_millis(),
            "Staged rows committed"
        );
        Ok(())
    }

    async fn persist_once(&self, phase: UpsertMode, deletes: &[Value]) -> Result<(), SinkError> {
        if !deletes.is_empty() {
            self.reconciler.delete_keys(deletes).await?;
        }

        match phase {
            UpsertMode::Replace => self.reconciler.reconcile(self.mode).await,
            UpsertMode::Append => self.reconciler.merge().await,
        }
    }

    /// Drops the staging table. Best effort, see [`StagingGuard::release`].
    pub async fn finish(&mut self) {
        self.staging.release().await;
    }
}

impl std::fmt::Debug for TableWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableWriter")
            .field("mode", &self.mode)
            .field("staging", &self.staging)
            .field("retry", &self.retry)
            .finish()
    }
}
