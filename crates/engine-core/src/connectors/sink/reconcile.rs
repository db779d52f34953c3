//! Moves staged rows into the destination according to the write mode.
//!
//! Nothing here commits. Callers wrap each step in a transaction, so every
//! step either lands completely or not at all and can be replayed.

use crate::error::SinkError;
use connectors::sql::{
    base::{adapter::SqlExecutor, destination::Destination, query::generator::QueryGenerator},
    mssql::temp_table::{TempTable, table_exists},
};
use model::{core::value::Value, execution::mode::WriteMode};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct Reconciler {
    executor: Arc<dyn SqlExecutor>,
    staging: TempTable,
}

impl Reconciler {
    pub fn new(executor: Arc<dyn SqlExecutor>, staging: TempTable) -> Self {
        Self { executor, staging }
    }

    pub fn destination(&self) -> &Destination {
        self.staging.destination()
    }

    pub fn staging(&self) -> &TempTable {
        &self.staging
    }

    /// Create mode must not touch a table that is already there.
    pub async fn verify_absent(&self) -> Result<(), SinkError> {
        let dest = self.destination();
        if table_exists(self.executor.as_ref(), &dest.table).await? {
            return Err(SinkError::DestinationExists {
                path: dest.path.to_string(),
            });
        }
        Ok(())
    }

    /// Persists the staged rows under `mode` and leaves staging empty.
    pub async fn reconcile(&self, mode: WriteMode) -> Result<(), SinkError> {
        debug!(%mode, table = %self.destination().table, "Reconciling staged rows");
        match mode {
            WriteMode::Create => self.create().await,
            WriteMode::Replace => self.replace().await,
            WriteMode::Truncate => self.truncate().await,
            WriteMode::Append => self.append().await,
        }
    }

    /// Upsert step: rows in the destination sharing a key with a staged row
    /// are replaced by the staged one. Without an id column this is a plain
    /// append.
    pub async fn merge(&self) -> Result<(), SinkError> {
        let dest = self.destination();
        self.ensure_destination().await?;

        if let Some(id) = &dest.id_column {
            let deleted = self.staging.delete_matching_keys(&dest.table, id).await?;
            debug!(table = %dest.table, deleted, "Removed rows superseded by staged keys");
        }
        self.flush().await
    }

    /// Deletes destination rows by id. A missing destination has nothing to
    /// delete.
    pub async fn delete_keys(&self, keys: &[Value]) -> Result<u64, SinkError> {
        let dest = self.destination();
        let Some(id) = &dest.id_column else {
            return Err(SinkError::Validation(format!(
                "{} has no id column to delete by",
                dest.path
            )));
        };

        if keys.is_empty() || !table_exists(self.executor.as_ref(), &dest.table).await? {
            return Ok(0);
        }

        let statements = QueryGenerator::delete_keys(&dest.table, id, keys);
        let deleted = self.executor.execute_all(&statements).await?;
        info!(table = %dest.table, keys = keys.len(), deleted, "Deleted rows by key");
        Ok(deleted)
    }

    async fn create(&self) -> Result<(), SinkError> {
        let dest = self.destination();
        if !table_exists(self.executor.as_ref(), &dest.table).await? {
            self.executor
                .execute(&QueryGenerator::create_table(&dest.table, &dest.columns, false))
                .await?;
            for column in self.index_columns() {
                self.executor
                    .execute(&QueryGenerator::create_index(&dest.table, column))
                    .await?;
            }
            info!(table = %dest.table, "Created destination table");
        }
        self.flush().await
    }

    /// The staging table becomes the destination, keeping the staging index,
    /// and a fresh staging table takes its place.
    async fn replace(&self) -> Result<(), SinkError> {
        let dest = self.destination();
        if table_exists(self.executor.as_ref(), &dest.table).await? {
            self.executor
                .execute(&QueryGenerator::drop_table(&dest.table))
                .await?;
        }

        self.staging.rename(&dest.table.name).await?;
        self.staging.create().await?;
        info!(table = %dest.table, "Replaced destination with staged rows");
        Ok(())
    }

    async fn truncate(&self) -> Result<(), SinkError> {
        let dest = self.destination();
        if table_exists(self.executor.as_ref(), &dest.table).await? {
            self.executor
                .execute(&QueryGenerator::truncate(&dest.table))
                .await?;
        } else {
            self.executor
                .execute(&QueryGenerator::create_table(&dest.table, &dest.columns, false))
                .await?;
        }
        self.flush().await
    }

    async fn append(&self) -> Result<(), SinkError> {
        self.ensure_destination().await?;
        self.flush().await
    }

    async fn ensure_destination(&self) -> Result<(), SinkError> {
        let dest = self.destination();
        self.executor
            .execute(&QueryGenerator::create_table(&dest.table, &dest.columns, true))
            .await?;
        Ok(())
    }

    /// Copies staging into the destination, then empties staging.
    async fn flush(&self) -> Result<(), SinkError> {
        let dest = self.destination();
        let copied = self.staging.insert_into(&dest.table).await?;
        self.staging.truncate().await?;
        debug!(table = %dest.table, rows = copied, "Copied staged rows");
        Ok(())
    }

    /// Filter column first, then the id column when it is a different one.
    fn index_columns(&self) -> Vec<&str> {
        let dest = self.destination();
        let mut columns: Vec<&str> = dest.filter_column.iter().map(String::as_str).collect();
        if let Some(id) = dest.id_column.as_deref()
            && !columns.contains(&id)
        {
            columns.push(id);
        }
        columns
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("staging", &self.staging)
            .finish()
    }
}
