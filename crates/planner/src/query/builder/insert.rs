use crate::query::{
    ast::{
        common::TableRef,
        insert::{Insert, InsertSource},
        select::Select,
    },
    value,
};
use model::records::row::Row;

#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: TableRef,
    columns: Vec<String>,
}

impl InsertBuilder {
    pub fn new(table: TableRef) -> Self {
        Self {
            table,
            columns: Vec::new(),
        }
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Finishes with a literal `VALUES` list, one tuple per row.
    pub fn values(self, rows: &[Row]) -> Insert {
        let rows = rows
            .iter()
            .map(|row| row.iter().cloned().map(value).collect())
            .collect();

        Insert {
            table: self.table,
            columns: self.columns,
            source: InsertSource::Values(rows),
        }
    }

    pub fn select(self, select: Select) -> Insert {
        Insert {
            table: self.table,
            columns: self.columns,
            source: InsertSource::Select(select),
        }
    }
}
