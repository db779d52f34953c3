use model::core::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(Ident),
    Value(Value),
    BinaryOp(Box<BinaryOp>),
    /// `expr IN (list...)`
    InList { expr: Box<Expr>, list: Vec<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    /// Table name or alias the column belongs to.
    pub qualifier: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub left: Expr,
    pub op: BinaryOperator,
    pub right: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Eq,
    Gt,
    GtEq,
    And,
}

impl BinaryOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            BinaryOperator::Eq => "=",
            BinaryOperator::Gt => ">",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::And => "AND",
        }
    }
}

impl Expr {
    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Self {
        Expr::BinaryOp(Box::new(BinaryOp { left, op, right }))
    }

    /// Joins with `AND`, keeping `self` on the left.
    pub fn and(self, other: Expr) -> Self {
        Expr::binary(self, BinaryOperator::And, other)
    }
}
