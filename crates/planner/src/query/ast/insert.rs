//! Defines the AST for an INSERT statement.

use crate::query::ast::{common::TableRef, expr::Expr, select::Select};

/// Represents a complete INSERT statement.
///
/// Rows come either from a literal `VALUES` list (one inner vector per row)
/// or from a `SELECT`.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: TableRef,
    pub columns: Vec<String>,
    pub source: InsertSource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    Values(Vec<Vec<Expr>>),
    Select(Select),
}
