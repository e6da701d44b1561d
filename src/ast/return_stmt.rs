use pest::iterators::Pair;

use super::{Expression, Position, Rule};

/// A `return` statement, with or without a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Return<T> {
    pub expr: Option<Expression<T>>,
    pub position: Position,
    pub info: T,
}

impl Return<()> {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> Return<()> {
        assert_eq!(pair.as_rule(), Rule::returnStmt);

        let (line, col) = pair.line_col();

        let expr = pair
            .into_inner()
            .next()
            .map(|expr| Expression::from_pair(expr, file));

        Return {
            expr,
            position: (file.to_owned(), line, col),
            info: (),
        }
    }
}
