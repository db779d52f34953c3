use crate::query::{
    ast::rename::RenameTable,
    renderer::{Render, Renderer},
};
use model::core::value::Value;

impl Render for RenameTable {
    fn render(&self, r: &mut Renderer) {
        // sp_rename takes the current name as a quoted multi-part identifier
        // but treats the new name literally, so it must stay unquoted.
        let current = Value::String(r.qualified_name(&self.table));
        let new_name = Value::String(self.new_name.clone());

        r.sql.push_str("EXEC sp_rename ");
        r.sql.push_str(&r.dialect.render_literal(&current));
        r.sql.push_str(", ");
        r.sql.push_str(&r.dialect.render_literal(&new_name));
        r.sql.push(';');
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        query::{
            ast::rename::RenameTable,
            dialect::SqlServer,
            renderer::{Render, Renderer},
        },
        table_ref,
    };

    #[test]
    fn test_render_rename() {
        let ast = RenameTable {
            table: table_ref!("dbo", "precog_temp_orders"),
            new_name: "orders".into(),
        };

        let mut renderer = Renderer::new(&SqlServer);
        ast.render(&mut renderer);

        assert_eq!(
            renderer.finish(),
            "EXEC sp_rename N'[dbo].[precog_temp_orders]', N'orders';"
        );
    }

    #[test]
    fn test_render_rename_escapes_quotes() {
        let ast = RenameTable {
            table: table_ref!("dbo", "tmp_it's"),
            new_name: "it's".into(),
        };

        let mut renderer = Renderer::new(&SqlServer);
        ast.render(&mut renderer);

        assert_eq!(
            renderer.finish(),
            "EXEC sp_rename N'[dbo].[tmp_it''s]', N'it''s';"
        );
    }
}
