//! Event-driven write session.
//!
//! Events are handled strictly in arrival order: row batches land in
//! staging, delete batches are held until the next commit, and each commit
//! marker persists everything received since the previous one before its
//! offset is passed on. Offsets therefore leave in the same order their
//! commit markers came in, and only once durable.

use crate::{
    consumer::{DataConsumer, SessionReport, components::writer::TableWriter},
    error::PipelineError,
};
use async_trait::async_trait;
use connectors::sql::base::{adapter::SqlExecutor, destination::Destination};
use engine_core::retry::RetryPolicy;
use model::{
    core::value::Value,
    events::data::DataEvent,
    execution::mode::{UpsertMode, WriteMode},
    pagination::offset::Offset,
    records::row::Row,
};
use std::{sync::Arc, time::Instant};
use tokio::sync::mpsc;
use tracing::{error, info, trace};

pub type EventReceiver = mpsc::Receiver<Result<DataEvent, PipelineError>>;

pub struct UpsertPipeline {
    writer: TableWriter,
    event_rx: EventReceiver,
    offset_tx: mpsc::Sender<Offset>,
    /// `Replace` until the first commit succeeds, `Append` afterwards.
    phase: UpsertMode,
    pending_deletes: Vec<Value>,
    report: SessionReport,
}

impl UpsertPipeline {
    pub fn new(writer: TableWriter, event_rx: EventReceiver, offset_tx: mpsc::Sender<Offset>) -> Self {
        Self {
            writer,
            event_rx,
            offset_tx,
            phase: UpsertMode::default(),
            pending_deletes: Vec::new(),
            report: SessionReport::default(),
        }
    }

    /// Starts a [`TableWriter`] for `destination` and wires it to the
    /// channels. Create-mode precondition failures surface here, before any
    /// event is read.
    pub async fn start(
        executor: Arc<dyn SqlExecutor>,
        destination: Arc<Destination>,
        mode: WriteMode,
        retry: RetryPolicy,
        staging_prefix: &str,
        event_rx: EventReceiver,
        offset_tx: mpsc::Sender<Offset>,
    ) -> Result<Self, PipelineError> {
        let writer = TableWriter::start(executor, destination.clone(), mode, retry, staging_prefix)
            .await
            .map_err(|e| PipelineError::sink(&destination, e))?;
        Ok(Self::new(writer, event_rx, offset_tx))
    }

    pub fn phase(&self) -> UpsertMode {
        self.phase
    }

    async fn consume(&mut self) -> Result<(), PipelineError> {
        while let Some(event) = self.event_rx.recv().await {
            match event? {
                DataEvent::Rows { rows } => self.on_rows(&rows).await?,
                DataEvent::Delete { keys } => self.on_delete(keys)?,
                DataEvent::Commit { offset } => self.on_commit(offset).await?,
            }
        }
        Ok(())
    }

    async fn on_rows(&mut self, rows: &[Row]) -> Result<(), PipelineError> {
        let result = self
            .writer
            .ingest(rows)
            .await
            .map_err(|e| PipelineError::sink(self.writer.destination(), e))?;

        self.report.batches += 1;
        self.report.rows += result.rows_written;
        Ok(())
    }

    fn on_delete(&mut self, keys: Vec<Value>) -> Result<(), PipelineError> {
        let destination = self.writer.destination();
        if destination.id_column.is_none() {
            return Err(PipelineError::DeleteWithoutId {
                path: destination.path.to_string(),
            });
        }

        trace!(keys = keys.len(), "Recorded keys to delete at next commit");
        self.pending_deletes.extend(keys);
        Ok(())
    }

    async fn on_commit(&mut self, offset: Offset) -> Result<(), PipelineError> {
        let deletes = std::mem::take(&mut self.pending_deletes);
        self.writer
            .persist(self.phase, &deletes)
            .await
            .map_err(|e| PipelineError::sink(self.writer.destination(), e))?;

        self.phase = UpsertMode::Append;
        self.report.commits += 1;
        self.report.deleted_keys += deletes.len();

        self.offset_tx
            .send(offset)
            .await
            .map_err(|_| PipelineError::OffsetChannelClosed)
    }
}

#[async_trait]
impl DataConsumer for UpsertPipeline {
    async fn run(&mut self) -> Result<SessionReport, PipelineError> {
        let start = Instant::now();
        let outcome = self.consume().await;

        // Staging goes away on every exit path.
        self.writer.finish().await;

        let path = self.writer.destination().path.to_string();
        match outcome {
            Ok(()) => {
                info!(
                    path = %path,
                    batches = self.report.batches,
                    rows = self.report.rows,
                    commits = self.report.commits,
                    duration_ms = start.elapsed().as_millis(),
                    "Write session finished"
                );
                Ok(self.report.clone())
            }
            Err(e) => {
                error!(path = %path, error = %e, "Write session failed");
                Err(e)
            }
        }
    }
}
