use crate::query::ast::{
    common::TableRef,
    create_table::{ColumnDef, CreateTable},
};
use model::core::column::Column;

#[derive(Debug, Clone)]
pub struct CreateTableBuilder {
    ast: CreateTable,
}

impl CreateTableBuilder {
    pub fn new(table: TableRef) -> Self {
        Self {
            ast: CreateTable {
                table,
                ..Default::default()
            },
        }
    }

    /// Adds nullable columns in order. Staged rows may carry nulls in any
    /// column, so no constraint is declared.
    pub fn columns(mut self, columns: &[Column]) -> Self {
        self.ast
            .columns
            .extend(columns.iter().map(|c| ColumnDef {
                name: c.name.clone(),
                data_type: c.vendor_type,
                is_nullable: true,
            }));
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.ast.if_not_exists = true;
        self
    }

    pub fn build(self) -> CreateTable {
        self.ast
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table_ref;
    use model::core::vendor_type::VendorType;

    #[test]
    fn test_create_table_builder_keeps_column_order() {
        let ast = CreateTableBuilder::new(table_ref!("dbo", "t"))
            .columns(&[
                Column::new("b", VendorType::Int),
                Column::new("a", VendorType::Bit),
            ])
            .if_not_exists()
            .build();

        assert!(ast.if_not_exists);
        let names: Vec<&str> = ast.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        assert!(ast.columns.iter().all(|c| c.is_nullable));
    }
}
