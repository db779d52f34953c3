use crate::query::{
    ast::delete::{Delete, DeleteFilter},
    renderer::{Render, Renderer},
};

const TARGET_ALIAS: &str = "target";
const STAGING_ALIAS: &str = "temp";

impl Render for Delete {
    fn render(&self, r: &mut Renderer) {
        match &self.filter {
            DeleteFilter::MatchingKeys { staging, key } => {
                r.sql.push_str("DELETE ");
                r.push_identifier(TARGET_ALIAS);
                r.sql.push_str(" FROM ");
                r.render_table_ref(&self.table);
                r.sql.push_str(" AS ");
                r.push_identifier(TARGET_ALIAS);
                r.sql.push_str(" INNER JOIN ");
                r.render_table_ref(staging);
                r.sql.push_str(" AS ");
                r.push_identifier(STAGING_ALIAS);
                r.sql.push_str(" ON ");
                r.push_identifier(TARGET_ALIAS);
                r.sql.push('.');
                r.push_identifier(key);
                r.sql.push_str(" = ");
                r.push_identifier(STAGING_ALIAS);
                r.sql.push('.');
                r.push_identifier(key);
            }
            DeleteFilter::Where(expr) => {
                r.sql.push_str("DELETE FROM ");
                r.render_table_ref(&self.table);
                r.sql.push_str(" WHERE ");
                expr.render(r);
            }
        }
        r.sql.push(';');
    }
}
