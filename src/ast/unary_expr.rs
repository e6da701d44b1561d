use super::{Expression, Position, UnaryOp};

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr<T> {
    pub op: UnaryOp,
    pub operand: Box<Expression<T>>,
    pub position: Position,
    pub info: T,
}
