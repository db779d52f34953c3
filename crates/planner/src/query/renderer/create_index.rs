use crate::query::{
    ast::create_index::CreateIndex,
    renderer::{Render, Renderer},
};

impl Render for CreateIndex {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("CREATE INDEX ");
        r.push_identifier(&self.name);
        r.sql.push_str(" ON ");
        r.render_table_ref(&self.table);
        r.sql.push_str(" (");
        r.push_identifiers(&self.columns);
        r.sql.push_str(");");
    }
}
