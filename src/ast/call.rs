use super::{Expression, Position};

/// A function call. The callee side has to resolve to an identifier; this is
/// enforced by the typing pass, not by the grammar.
#[derive(Debug, Clone, PartialEq)]
pub struct Call<T> {
    pub callee: Box<Expression<T>>,
    pub args: Vec<Expression<T>>,
    pub position: Position,
    pub info: T,
}
