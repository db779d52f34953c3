//! Catalog probes returning a single scalar.

use crate::query::ast::common::TableRef;

/// Yields `1` if the table exists and `0` otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct TableExists {
    pub table: TableRef,
}
