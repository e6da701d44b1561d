use pest::iterators::Pair;

use super::{Expression, Position, Rule, Statement};

#[derive(Debug, Clone, PartialEq)]
pub struct If<T> {
    pub condition: Expression<T>,
    pub then_branch: Box<Statement<T>>,
    pub else_branch: Option<Box<Statement<T>>>,
    pub position: Position,
    pub info: T,
}

impl If<()> {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> If<()> {
        assert_eq!(pair.as_rule(), Rule::ifStmt);

        let (line, col) = pair.line_col();

        let mut inner = pair.into_inner().filter(|p| p.as_rule() != Rule::kwElse);

        let condition = Expression::from_pair(
            inner
                .next()
                .unwrap_or_else(|| panic!("expected condition in if statement at {line}:{col}")),
            file,
        );
        let then_branch = Box::new(Statement::from_pair(
            inner
                .next()
                .unwrap_or_else(|| panic!("expected branch in if statement at {line}:{col}")),
            file,
        ));
        let else_branch = inner
            .next()
            .map(|branch| Box::new(Statement::from_pair(branch, file)));

        If {
            condition,
            then_branch,
            else_branch,
            position: (file.to_owned(), line, col),
            info: (),
        }
    }
}
