use pest::iterators::Pair;

use super::{Expression, Position, Rule, Statement};

#[derive(Debug, Clone, PartialEq)]
pub struct WhileLoop<T> {
    pub condition: Expression<T>,
    pub body: Box<Statement<T>>,
    pub position: Position,
    pub info: T,
}

impl WhileLoop<()> {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> WhileLoop<()> {
        assert_eq!(pair.as_rule(), Rule::whileStmt);

        let (line, col) = pair.line_col();

        let mut inner = pair.into_inner();

        let condition = Expression::from_pair(
            inner
                .next()
                .unwrap_or_else(|| panic!("expected condition in while loop at {line}:{col}")),
            file,
        );
        let body = Box::new(Statement::from_pair(
            inner
                .next()
                .unwrap_or_else(|| panic!("expected body in while loop at {line}:{col}")),
            file,
        ));

        WhileLoop {
            condition,
            body,
            position: (file.to_owned(), line, col),
            info: (),
        }
    }
}
