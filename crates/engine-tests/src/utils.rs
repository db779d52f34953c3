#![allow(dead_code)]

use crate::memory::MemoryExecutor;
use connectors::sql::{
    base::{
        adapter::SqlExecutor,
        destination::{DEFAULT_SCHEMA, Destination},
    },
    mssql::temp_table::DEFAULT_STAGING_PREFIX,
};
use engine_core::retry::RetryPolicy;
use engine_processing::{
    consumer::{DataConsumer, SessionReport, upsert::UpsertPipeline},
    error::PipelineError,
};
use model::{
    core::{column::Column, identifiers::ResourcePath, value::Value, vendor_type::VendorType},
    events::data::DataEvent,
    execution::mode::WriteMode,
    pagination::offset::{Offset, OffsetKey},
    records::row::Row,
};
use planner::{query::ast::common::TableRef, table_ref};
use std::{sync::Arc, time::Duration};
use tokio::sync::mpsc;

pub const DEST_TABLE: &str = "orders";

pub fn dest_ref() -> TableRef {
    table_ref!(DEFAULT_SCHEMA, DEST_TABLE)
}

pub fn staging_ref() -> TableRef {
    table_ref!(DEFAULT_SCHEMA, format!("{DEFAULT_STAGING_PREFIX}{DEST_TABLE}"))
}

/// `/orders` with columns `id BIGINT, name NVARCHAR(100)`.
pub fn orders(id_column: Option<&str>, filter_column: Option<&str>) -> Arc<Destination> {
    let destination = Destination::new(
        ResourcePath::from("/orders"),
        DEFAULT_SCHEMA,
        vec![
            Column::new("id", VendorType::BigInt),
            Column::new("name", VendorType::nvarchar(100).expect("valid length")),
        ],
    )
    .expect("valid destination")
    .with_id_column(id_column.map(String::from))
    .with_filter_column(filter_column.map(String::from));
    Arc::new(destination)
}

pub fn row(id: i64, name: &str) -> Row {
    vec![Value::Int(id), Value::String(name.to_string())]
}

pub fn rows(ids: &[i64]) -> DataEvent {
    DataEvent::Rows {
        rows: ids.iter().map(|id| row(*id, &format!("order-{id}"))).collect(),
    }
}

pub fn commit(n: i64) -> DataEvent {
    DataEvent::Commit { offset: offset(n) }
}

pub fn delete(ids: &[i64]) -> DataEvent {
    DataEvent::Delete {
        keys: ids.iter().map(|id| Value::Int(*id)).collect(),
    }
}

pub fn offset(n: i64) -> Offset {
    Offset::field("id", OffsetKey::Int(n))
}

/// Retries quickly so failure tests stay fast.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(5))
}

/// Seeds the destination with committed rows.
pub fn seed_orders(executor: &MemoryExecutor, ids: &[i64]) {
    executor.seed(
        &dest_ref(),
        &["id", "name"],
        ids.iter().map(|id| row(*id, &format!("old-{id}"))).collect(),
    );
}

/// Ids in the committed destination, sorted.
pub fn dest_ids(executor: &MemoryExecutor) -> Vec<i64> {
    let mut ids: Vec<i64> = executor
        .table(&dest_ref())
        .map(|t| t.column_values("id"))
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_i64)
        .collect();
    ids.sort_unstable();
    ids
}

pub struct SessionOutcome {
    pub result: Result<SessionReport, PipelineError>,
    pub offsets: Vec<Offset>,
}

/// Runs one write session over `events` and collects the emitted offsets.
pub async fn run_session(
    executor: Arc<MemoryExecutor>,
    destination: Arc<Destination>,
    mode: WriteMode,
    events: Vec<Result<DataEvent, PipelineError>>,
) -> SessionOutcome {
    run_session_with(executor, destination, mode, fast_retry(), events).await
}

pub async fn run_session_with(
    executor: Arc<MemoryExecutor>,
    destination: Arc<Destination>,
    mode: WriteMode,
    retry: RetryPolicy,
    events: Vec<Result<DataEvent, PipelineError>>,
) -> SessionOutcome {
    let (event_tx, event_rx) = mpsc::channel(events.len().max(1));
    let (offset_tx, mut offset_rx) = mpsc::channel(events.len().max(1));
    for event in events {
        event_tx.send(event).await.expect("event channel open");
    }
    drop(event_tx);

    let executor: Arc<dyn SqlExecutor> = executor;
    let result = match UpsertPipeline::start(
        executor,
        destination,
        mode,
        retry,
        DEFAULT_STAGING_PREFIX,
        event_rx,
        offset_tx,
    )
    .await
    {
        Ok(mut pipeline) => pipeline.run().await,
        Err(e) => Err(e),
    };

    let mut offsets = Vec::new();
    while let Ok(offset) = offset_rx.try_recv() {
        offsets.push(offset);
    }
    SessionOutcome { result, offsets }
}

pub fn ok(events: Vec<DataEvent>) -> Vec<Result<DataEvent, PipelineError>> {
    events.into_iter().map(Ok).collect()
}
