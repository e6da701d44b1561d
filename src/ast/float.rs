use pest::iterators::Pair;

use super::{Position, Rule};

#[derive(Debug, Clone, PartialEq)]
pub struct Float<T> {
    pub value: f32,
    pub position: Position,
    pub info: T,
}

impl Float<()> {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> Float<()> {
        assert_eq!(pair.as_rule(), Rule::float);

        let (line, col) = pair.line_col();

        Float {
            value: pair
                .as_str()
                .parse::<f32>()
                .unwrap_or_else(|_| panic!("invalid float literal at {line}:{col}")),
            position: (file.to_owned(), line, col),
            info: (),
        }
    }
}
