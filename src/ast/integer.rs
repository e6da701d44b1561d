use pest::iterators::Pair;

use super::{Position, Rule};

#[derive(Debug, Clone, PartialEq)]
pub struct Integer<T> {
    pub value: i32,
    pub position: Position,
    pub info: T,
}

impl Integer<()> {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> Integer<()> {
        assert_eq!(pair.as_rule(), Rule::integer);

        let (line, col) = pair.line_col();

        Integer {
            value: pair
                .as_str()
                .parse::<i32>()
                .unwrap_or_else(|_| panic!("integer literal out of range at {line}:{col}")),
            position: (file.to_owned(), line, col),
            info: (),
        }
    }
}
