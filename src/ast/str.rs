use pest::iterators::Pair;

use super::{Position, Rule};

#[derive(Debug, Clone, PartialEq)]
pub struct Str<T> {
    pub value: String,
    pub position: Position,
    pub info: T,
}

impl Str<()> {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> Str<()> {
        assert_eq!(pair.as_rule(), Rule::string);

        let (line, col) = pair.line_col();

        let inner = pair
            .into_inner()
            .next()
            .map(|content| content.as_str().to_owned())
            .unwrap_or_default();

        let value = unescape::unescape(&inner)
            .unwrap_or_else(|| panic!("invalid escape sequence in string literal at {line}:{col}"));

        Str {
            value,
            position: (file.to_owned(), line, col),
            info: (),
        }
    }
}
