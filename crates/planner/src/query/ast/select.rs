//! Defines the Abstract Syntax Tree (AST) for a SELECT query.

use crate::query::ast::{common::TableRef, expr::Expr};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Select {
    /// The list of columns or expressions to be returned. Empty means `*`.
    pub columns: Vec<Expr>,

    /// The primary table for the query.
    pub from: Option<TableRef>,

    /// The WHERE clause condition.
    pub where_clause: Option<Expr>,
}
