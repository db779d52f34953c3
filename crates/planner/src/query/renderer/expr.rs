use crate::query::{
    ast::expr::Expr,
    renderer::{Render, Renderer},
};

impl Render for Expr {
    fn render(&self, r: &mut Renderer) {
        match self {
            Expr::Identifier(ident) => {
                if let Some(qualifier) = &ident.qualifier {
                    r.push_identifier(qualifier);
                    r.sql.push('.');
                }
                r.push_identifier(&ident.name);
            }
            Expr::Value(value) => {
                let literal = r.dialect.render_literal(value);
                r.sql.push_str(&literal);
            }
            Expr::BinaryOp(op) => {
                op.left.render(r);
                r.sql.push(' ');
                r.sql.push_str(op.op.as_sql());
                r.sql.push(' ');
                op.right.render(r);
            }
            Expr::InList { expr, list } => {
                expr.render(r);
                r.sql.push_str(" IN (");
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        r.sql.push_str(", ");
                    }
                    item.render(r);
                }
                r.sql.push(')');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::query::{
        ast::expr::{BinaryOperator, Expr},
        dialect::SqlServer,
        ident, ident_q,
        renderer::{Render, Renderer},
        value,
    };
    use model::core::value::Value;

    #[test]
    fn test_render_binary_and_in_list() {
        let expr = Expr::binary(ident("ts"), BinaryOperator::GtEq, value(Value::Int(10))).and(
            Expr::InList {
                expr: Box::new(ident_q("t", "id")),
                list: vec![value(Value::Int(1)), value(Value::String("x".into()))],
            },
        );

        let mut renderer = Renderer::new(&SqlServer);
        expr.render(&mut renderer);

        assert_eq!(
            renderer.finish(),
            "[ts] >= 10 AND [t].[id] IN (1, N'x')"
        );
    }
}
