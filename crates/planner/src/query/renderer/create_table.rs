use crate::query::{
    ast::create_table::CreateTable,
    renderer::{Render, Renderer},
};

impl Render for CreateTable {
    fn render(&self, r: &mut Renderer) {
        if self.if_not_exists {
            // No IF NOT EXISTS for tables, so probe the catalog instead.
            let name = r.qualified_name(&self.table);
            let name = r
                .dialect
                .render_literal(&model::core::value::Value::String(name));
            r.sql.push_str(&format!("IF OBJECT_ID({name}, N'U') IS NULL "));
        }

        r.sql.push_str("CREATE TABLE ");
        r.render_table_ref(&self.table);
        r.sql.push_str(" (");

        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            r.push_identifier(&col.name);
            r.sql.push(' ');
            let data_type = r.dialect.render_data_type(&col.data_type);
            r.sql.push_str(&data_type);
            if !col.is_nullable {
                r.sql.push_str(" NOT NULL");
            }
        }

        r.sql.push_str(");");
    }
}
