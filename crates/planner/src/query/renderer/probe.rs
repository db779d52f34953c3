use crate::query::{
    ast::probe::TableExists,
    renderer::{Render, Renderer},
};
use model::core::value::Value;

impl Render for TableExists {
    fn render(&self, r: &mut Renderer) {
        let schema = match &self.table.schema {
            Some(schema) => r.dialect.render_literal(&Value::String(schema.clone())),
            None => "SCHEMA_NAME()".to_string(),
        };
        let name = r
            .dialect
            .render_literal(&Value::String(self.table.name.clone()));

        r.sql.push_str(
            "SELECT CASE WHEN EXISTS (SELECT 1 FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_SCHEMA = ",
        );
        r.sql.push_str(&schema);
        r.sql.push_str(" AND TABLE_NAME = ");
        r.sql.push_str(&name);
        r.sql.push_str(") THEN 1 ELSE 0 END;");
    }
}
