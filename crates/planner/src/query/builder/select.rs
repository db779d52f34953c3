use crate::query::{
    ast::{common::TableRef, expr::Expr, select::Select},
    ident,
};

#[derive(Debug, Clone, Default)]
pub struct SelectBuilder {
    pub ast: Select,
}

impl SelectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.ast.columns = columns.iter().map(|c| ident(c)).collect();
        self
    }

    pub fn from(mut self, table: TableRef) -> Self {
        self.ast.from = Some(table);
        self
    }

    /// Adds a condition, combining with any existing one via `AND`.
    pub fn where_clause(mut self, condition: Expr) -> Self {
        self.ast.where_clause = Some(match self.ast.where_clause.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    pub fn build(self) -> Select {
        self.ast
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{query::ast::expr::BinaryOperator, table_ref, value};
    use model::core::value::Value;

    #[test]
    fn test_where_conditions_are_combined() {
        let select = SelectBuilder::new()
            .from(table_ref!("dbo", "t"))
            .where_clause(Expr::binary(ident("a"), BinaryOperator::Eq, value!(Value::Int(1))))
            .where_clause(Expr::binary(ident("b"), BinaryOperator::Gt, value!(Value::Int(2))))
            .build();

        match select.where_clause {
            Some(Expr::BinaryOp(op)) => assert_eq!(op.op, BinaryOperator::And),
            other => panic!("unexpected where clause: {other:?}"),
        }
    }
}
