//! Defines the AST for DELETE statements.

use crate::query::ast::{common::TableRef, expr::Expr};

#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: TableRef,
    pub filter: DeleteFilter,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteFilter {
    /// Remove rows of the target whose `key` also appears in `staging`.
    MatchingKeys { staging: TableRef, key: String },
    /// Plain `WHERE` condition.
    Where(Expr),
}
