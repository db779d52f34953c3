use crate::query::ast::common::TableRef;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndex {
    pub name: String,
    pub table: TableRef,
    pub columns: Vec<String>,
}
