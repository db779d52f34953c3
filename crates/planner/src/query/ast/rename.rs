use crate::query::ast::common::TableRef;

/// Renames a table within its schema. `new_name` is the bare table name;
/// the schema never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct RenameTable {
    pub table: TableRef,
    pub new_name: String,
}
