use model::{
    core::{column::Column, value::Value},
    records::row::Row,
};
use planner::query::{
    ast::{
        common::TableRef,
        create_index::CreateIndex,
        delete::{Delete, DeleteFilter},
        expr::Expr,
        probe::TableExists,
        rename::RenameTable,
        statement::Statement,
        truncate::Truncate,
    },
    builder::{
        create_table::CreateTableBuilder, drop_table::DropTableBuilder, insert::InsertBuilder,
        select::SelectBuilder,
    },
    ident, value,
};

/// SQL Server rejects more than 1000 row constructors in one `VALUES` list.
pub const MAX_VALUES_ROWS: usize = 1000;

/// Longest identifier SQL Server accepts.
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Builds the statements the staging protocol issues.
pub struct QueryGenerator;

impl QueryGenerator {
    pub fn table_exists(table: &TableRef) -> Statement {
        TableExists {
            table: table.clone(),
        }
        .into()
    }

    pub fn create_table(table: &TableRef, columns: &[Column], if_not_exists: bool) -> Statement {
        let mut builder = CreateTableBuilder::new(table.clone()).columns(columns);
        if if_not_exists {
            builder = builder.if_not_exists();
        }
        builder.build().into()
    }

    pub fn drop_table(table: &TableRef) -> Statement {
        DropTableBuilder::new(table.clone())
            .if_exists()
            .build()
            .into()
    }

    pub fn truncate(table: &TableRef) -> Statement {
        Truncate {
            table: table.clone(),
        }
        .into()
    }

    pub fn rename(table: &TableRef, new_name: &str) -> Statement {
        RenameTable {
            table: table.clone(),
            new_name: new_name.to_string(),
        }
        .into()
    }

    pub fn create_index(table: &TableRef, column: &str) -> Statement {
        CreateIndex {
            name: index_name(&table.name, column),
            table: table.clone(),
            columns: vec![column.to_string()],
        }
        .into()
    }

    /// Multi-row inserts, one statement per [`MAX_VALUES_ROWS`] rows.
    pub fn insert_values(table: &TableRef, columns: &[&str], rows: &[Row]) -> Vec<Statement> {
        rows.chunks(MAX_VALUES_ROWS)
            .map(|chunk| {
                InsertBuilder::new(table.clone())
                    .columns(columns)
                    .values(chunk)
                    .into()
            })
            .collect()
    }

    /// `INSERT INTO target (cols) SELECT cols FROM source`
    pub fn insert_select(target: &TableRef, source: &TableRef, columns: &[&str]) -> Statement {
        let select = SelectBuilder::new()
            .columns(columns)
            .from(source.clone())
            .build();

        InsertBuilder::new(target.clone())
            .columns(columns)
            .select(select)
            .into()
    }

    pub fn delete_matching_keys(target: &TableRef, staging: &TableRef, key: &str) -> Statement {
        Delete {
            table: target.clone(),
            filter: DeleteFilter::MatchingKeys {
                staging: staging.clone(),
                key: key.to_string(),
            },
        }
        .into()
    }

    /// `DELETE FROM table WHERE key IN (...)`, chunked like inserts.
    pub fn delete_keys(table: &TableRef, key: &str, keys: &[Value]) -> Vec<Statement> {
        keys.chunks(MAX_VALUES_ROWS)
            .map(|chunk| {
                Delete {
                    table: table.clone(),
                    filter: DeleteFilter::Where(Expr::InList {
                        expr: Box::new(ident(key)),
                        list: chunk.iter().cloned().map(value).collect(),
                    }),
                }
                .into()
            })
            .collect()
    }
}

/// `<table>_<column>_idx`, cut to the identifier length limit.
pub fn index_name(table: &str, column: &str) -> String {
    truncate_identifier(format!("{table}_{column}_idx"))
}

pub fn truncate_identifier(mut name: String) -> String {
    if name.chars().count() > MAX_IDENTIFIER_LEN {
        name = name.chars().take(MAX_IDENTIFIER_LEN).collect();
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::vendor_type::VendorType;
    use planner::{
        query::{ast::insert::InsertSource, dialect::SqlServer},
        table_ref,
    };

    #[test]
    fn test_insert_values_chunks_rows() {
        let rows: Vec<Row> = (0..2500).map(|i| vec![Value::Int(i)]).collect();
        let statements = QueryGenerator::insert_values(&table_ref!("dbo", "t"), &["id"], &rows);

        let sizes: Vec<usize> = statements
            .iter()
            .map(|s| match s {
                Statement::Insert(insert) => match &insert.source {
                    InsertSource::Values(v) => v.len(),
                    InsertSource::Select(_) => 0,
                },
                _ => 0,
            })
            .collect();
        assert_eq!(sizes, [1000, 1000, 500]);
        assert!(QueryGenerator::insert_values(&table_ref!("t"), &["id"], &[]).is_empty());
    }

    #[test]
    fn test_insert_select_sql() {
        let sql = QueryGenerator::insert_select(
            &table_ref!("dbo", "orders"),
            &table_ref!("dbo", "precog_temp_orders"),
            &["id", "total"],
        )
        .to_sql(&SqlServer);

        assert_eq!(
            sql,
            "INSERT INTO [dbo].[orders] ([id], [total]) SELECT [id], [total] FROM [dbo].[precog_temp_orders];"
        );
    }

    #[test]
    fn test_create_table_and_index_sql() {
        let table = table_ref!("dbo", "orders");
        let create = QueryGenerator::create_table(
            &table,
            &[Column::new("id", VendorType::BigInt)],
            false,
        );
        assert_eq!(
            create.to_sql(&SqlServer),
            "CREATE TABLE [dbo].[orders] ([id] BIGINT);"
        );

        let index = QueryGenerator::create_index(&table, "id");
        assert_eq!(
            index.to_sql(&SqlServer),
            "CREATE INDEX [orders_id_idx] ON [dbo].[orders] ([id]);"
        );
    }

    #[test]
    fn test_delete_keys_sql() {
        let statements = QueryGenerator::delete_keys(
            &table_ref!("dbo", "orders"),
            "id",
            &[Value::Int(1), Value::String("x'y".into())],
        );
        assert_eq!(statements.len(), 1);
        assert_eq!(
            statements[0].to_sql(&SqlServer),
            "DELETE FROM [dbo].[orders] WHERE [id] IN (1, N'x''y');"
        );
    }

    #[test]
    fn test_index_name_is_bounded() {
        let long = "x".repeat(200);
        assert_eq!(index_name(&long, "id").chars().count(), MAX_IDENTIFIER_LEN);
        assert_eq!(index_name("t", "c"), "t_c_idx");
    }
}
