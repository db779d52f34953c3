use crate::query::{
    ast::truncate::Truncate,
    renderer::{Render, Renderer},
};

impl Render for Truncate {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("TRUNCATE TABLE ");
        r.render_table_ref(&self.table);
        r.sql.push(';');
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        query::{
            ast::truncate::Truncate,
            dialect::SqlServer,
            renderer::{Render, Renderer},
        },
        table_ref,
    };

    #[test]
    fn test_render_truncate() {
        let mut renderer = Renderer::new(&SqlServer);
        Truncate {
            table: table_ref!("dbo", "events"),
        }
        .render(&mut renderer);

        assert_eq!(renderer.finish(), "TRUNCATE TABLE [dbo].[events];");
    }
}
