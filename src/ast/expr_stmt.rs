use pest::iterators::Pair;

use super::{Expression, Position, Rule};

/// An expression statement; the expression may be missing (a bare `;`).
#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt<T> {
    pub expr: Option<Expression<T>>,
    pub position: Position,
    pub info: T,
}

impl ExprStmt<()> {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> ExprStmt<()> {
        assert_eq!(pair.as_rule(), Rule::exprStmt);

        let (line, col) = pair.line_col();

        let expr = pair
            .into_inner()
            .next()
            .map(|expr| Expression::from_pair(expr, file));

        ExprStmt {
            expr,
            position: (file.to_owned(), line, col),
            info: (),
        }
    }
}
