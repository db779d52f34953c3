use crate::query::{
    ast::insert::{Insert, InsertSource},
    renderer::{Render, Renderer},
};

impl Render for Insert {
    fn render(&self, r: &mut Renderer) {
        // 1. INSERT INTO table (...)
        r.sql.push_str("INSERT INTO ");
        r.render_table_ref(&self.table);
        if !self.columns.is_empty() {
            r.sql.push_str(" (");
            r.push_identifiers(&self.columns);
            r.sql.push(')');
        }

        // 2. VALUES (...) or SELECT ...
        match &self.source {
            InsertSource::Values(rows) => render_values(rows, r),
            InsertSource::Select(select) => {
                r.sql.push(' ');
                select.render(r);
                // The nested select already terminated the statement.
                return;
            }
        }
        r.sql.push(';');
    }
}

fn render_values(rows: &[Vec<crate::query::ast::expr::Expr>], r: &mut Renderer) {
    r.sql.push_str(" VALUES ");
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            r.sql.push_str(", ");
        }
        r.sql.push('(');
        for (j, val) in row.iter().enumerate() {
            if j > 0 {
                r.sql.push_str(", ");
            }
            val.render(r);
        }
        r.sql.push(')');
    }
}
