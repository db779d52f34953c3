//! Lifecycle of the staging table a write session lands rows in.
//!
//! Every operation runs inside the executor's open transaction and none of
//! them commits. DDL is guarded by existence probes so each step can be
//! replayed after a rollback.

use crate::sql::base::{
    adapter::SqlExecutor,
    destination::Destination,
    error::DbError,
    query::generator::{QueryGenerator, truncate_identifier},
};
use model::records::row::Row;
use planner::query::ast::common::TableRef;
use std::sync::Arc;
use tracing::{debug, trace};

pub const DEFAULT_STAGING_PREFIX: &str = "precog_temp_";

pub async fn table_exists(executor: &dyn SqlExecutor, table: &TableRef) -> Result<bool, DbError> {
    let flag = executor
        .query_scalar(&QueryGenerator::table_exists(table))
        .await?;
    Ok(flag == 1)
}

#[derive(Clone)]
pub struct TempTable {
    executor: Arc<dyn SqlExecutor>,
    destination: Arc<Destination>,
    table: TableRef,
}

impl TempTable {
    /// Staging lives next to the destination, named `<prefix><destination>`.
    pub fn new(executor: Arc<dyn SqlExecutor>, destination: Arc<Destination>, prefix: &str) -> Self {
        let name = truncate_identifier(format!("{prefix}{}", destination.table.name));
        let table = destination.table.sibling(name);
        Self {
            executor,
            destination,
            table,
        }
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub async fn exists(&self) -> Result<bool, DbError> {
        table_exists(self.executor.as_ref(), &self.table).await
    }

    pub async fn drop(&self) -> Result<(), DbError> {
        if self.exists().await? {
            debug!(table = %self.table, "Dropping staging table");
            self.executor
                .execute(&QueryGenerator::drop_table(&self.table))
                .await?;
        }
        Ok(())
    }

    /// Creates the staging table with the destination's columns, indexed on
    /// the filter column when one is configured. No-op if it already exists.
    pub async fn create(&self) -> Result<(), DbError> {
        if self.exists().await? {
            return Ok(());
        }

        debug!(table = %self.table, "Creating staging table");
        self.executor
            .execute(&QueryGenerator::create_table(
                &self.table,
                &self.destination.columns,
                false,
            ))
            .await?;

        if let Some(filter) = &self.destination.filter_column {
            self.executor
                .execute(&QueryGenerator::create_index(&self.table, filter))
                .await?;
        }
        Ok(())
    }

    pub async fn truncate(&self) -> Result<(), DbError> {
        if self.exists().await? {
            self.executor
                .execute(&QueryGenerator::truncate(&self.table))
                .await?;
        }
        Ok(())
    }

    /// Inserts a batch of rows, values ordered like the destination columns.
    pub async fn ingest(&self, rows: &[Row]) -> Result<u64, DbError> {
        let width = self.destination.columns.len();
        if let Some(bad) = rows.iter().find(|row| row.len() != width) {
            return Err(DbError::Write(format!(
                "row has {} values but {} has {width} columns",
                bad.len(),
                self.destination.path
            )));
        }

        let columns = self.destination.column_names();
        let statements = QueryGenerator::insert_values(&self.table, &columns, rows);
        trace!(
            table = %self.table,
            rows = rows.len(),
            chunks = statements.len(),
            "Ingesting rows into staging"
        );
        self.executor.execute_all(&statements).await
    }

    /// Copies every staged row into `target`.
    pub async fn insert_into(&self, target: &TableRef) -> Result<u64, DbError> {
        let columns = self.destination.column_names();
        self.executor
            .execute(&QueryGenerator::insert_select(target, &self.table, &columns))
            .await
    }

    /// Renames staging in place. Afterwards the staging name is free again.
    pub async fn rename(&self, new_name: &str) -> Result<(), DbError> {
        debug!(table = %self.table, new_name, "Renaming staging table");
        self.executor
            .execute(&QueryGenerator::rename(&self.table, new_name))
            .await?;
        Ok(())
    }

    /// Removes rows from `target` whose `key` also appears in staging.
    pub async fn delete_matching_keys(&self, target: &TableRef, key: &str) -> Result<u64, DbError> {
        let deleted = self
            .executor
            .execute(&QueryGenerator::delete_matching_keys(target, &self.table, key))
            .await?;
        trace!(table = %target, deleted, "Deleted rows with staged keys");
        Ok(deleted)
    }
}

impl std::fmt::Debug for TempTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TempTable")
            .field("table", &self.table)
            .field("destination", &self.destination.table)
            .finish()
    }
}
