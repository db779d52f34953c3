use crate::sql::base::error::DbError;
use model::core::{column::Column, identifiers::ResourcePath};
use planner::{query::ast::common::TableRef, table_ref};

pub const DEFAULT_SCHEMA: &str = "dbo";

/// A destination table resolved from a resource path, with the column
/// layout every staged row follows.
#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub path: ResourcePath,
    pub table: TableRef,
    pub columns: Vec<Column>,
    /// Key used to match rows on merge and delete.
    pub id_column: Option<String>,
    /// Column incremental reads filter on; indexed on staging and on created
    /// destinations.
    pub filter_column: Option<String>,
}

impl Destination {
    pub fn new(
        path: ResourcePath,
        default_schema: &str,
        columns: Vec<Column>,
    ) -> Result<Self, DbError> {
        let table = resolve_table(&path, default_schema)?;
        if columns.is_empty() {
            return Err(DbError::Write(format!("no columns given for {path}")));
        }

        Ok(Self {
            path,
            table,
            columns,
            id_column: None,
            filter_column: None,
        })
    }

    pub fn with_id_column(mut self, column: Option<String>) -> Self {
        self.id_column = column;
        self
    }

    pub fn with_filter_column(mut self, column: Option<String>) -> Self {
        self.filter_column = column;
        self
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// `[table]` resolves into the default schema, `[schema, table]` is taken as
/// is. Any other shape does not address a table.
pub fn resolve_table(path: &ResourcePath, default_schema: &str) -> Result<TableRef, DbError> {
    match path.segments() {
        [table] => Ok(table_ref!(default_schema, table)),
        [schema, table] => Ok(table_ref!(schema, table)),
        _ => Err(DbError::InvalidPath(format!(
            "{path}: expected /table or /schema/table"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::vendor_type::VendorType;

    #[test]
    fn test_resolve_table() {
        let single = resolve_table(&ResourcePath::from("/orders"), DEFAULT_SCHEMA).unwrap();
        assert_eq!(single, table_ref!("dbo", "orders"));

        let qualified = resolve_table(&ResourcePath::from("/sales/orders"), "dbo").unwrap();
        assert_eq!(qualified, table_ref!("sales", "orders"));

        assert!(matches!(
            resolve_table(&ResourcePath::from("/a/b/c"), "dbo"),
            Err(DbError::InvalidPath(_))
        ));
        assert!(resolve_table(&ResourcePath::from("/"), "dbo").is_err());
    }

    #[test]
    fn test_destination_requires_columns() {
        assert!(Destination::new(ResourcePath::from("/t"), "dbo", vec![]).is_err());

        let dest = Destination::new(
            ResourcePath::from("/t"),
            "dbo",
            vec![Column::new("id", VendorType::Int)],
        )
        .unwrap()
        .with_id_column(Some("id".into()));

        assert_eq!(dest.column_names(), ["id"]);
        assert_eq!(dest.id_column.as_deref(), Some("id"));
    }
}
