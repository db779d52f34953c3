use crate::query::{
    ast::{
        create_index::CreateIndex, create_table::CreateTable, delete::Delete,
        drop_table::DropTable, insert::Insert, probe::TableExists, rename::RenameTable,
        select::Select, truncate::Truncate,
    },
    dialect::Dialect,
    renderer::{Render, Renderer},
};

/// Every statement the write and read paths issue.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTable),
    DropTable(DropTable),
    Truncate(Truncate),
    RenameTable(RenameTable),
    CreateIndex(CreateIndex),
    Insert(Insert),
    Delete(Delete),
    Select(Select),
    TableExists(TableExists),
}

impl Statement {
    pub fn to_sql(&self, dialect: &dyn Dialect) -> String {
        let mut renderer = Renderer::new(dialect);
        self.render(&mut renderer);
        renderer.finish()
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::CreateTable(_) => "create_table",
            Statement::DropTable(_) => "drop_table",
            Statement::Truncate(_) => "truncate",
            Statement::RenameTable(_) => "rename_table",
            Statement::CreateIndex(_) => "create_index",
            Statement::Insert(_) => "insert",
            Statement::Delete(_) => "delete",
            Statement::Select(_) => "select",
            Statement::TableExists(_) => "table_exists",
        }
    }
}

impl Render for Statement {
    fn render(&self, r: &mut Renderer) {
        match self {
            Statement::CreateTable(s) => s.render(r),
            Statement::DropTable(s) => s.render(r),
            Statement::Truncate(s) => s.render(r),
            Statement::RenameTable(s) => s.render(r),
            Statement::CreateIndex(s) => s.render(r),
            Statement::Insert(s) => s.render(r),
            Statement::Delete(s) => s.render(r),
            Statement::Select(s) => s.render(r),
            Statement::TableExists(s) => s.render(r),
        }
    }
}

macro_rules! impl_from_statement {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for Statement {
                fn from(value: $variant) -> Self {
                    Statement::$variant(value)
                }
            }
        )*
    };
}

impl_from_statement!(
    CreateTable,
    DropTable,
    Truncate,
    RenameTable,
    CreateIndex,
    Insert,
    Delete,
    Select,
    TableExists,
);
