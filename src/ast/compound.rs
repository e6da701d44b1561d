use pest::iterators::Pair;

use super::{Position, Rule, Statement};

/// A braced sequence of declarations and statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Compound<T> {
    pub items: Vec<Statement<T>>,
    pub position: Position,
    pub info: T,
}

impl Compound<()> {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> Compound<()> {
        assert_eq!(pair.as_rule(), Rule::compound);

        let (line, col) = pair.line_col();

        let items = pair
            .into_inner()
            .map(|item| Statement::from_pair(item, file))
            .collect();

        Compound {
            items,
            position: (file.to_owned(), line, col),
            info: (),
        }
    }
}
