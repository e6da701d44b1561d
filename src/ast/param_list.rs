use pest::iterators::Pair;

use super::{ParamDecl, Position, Rule};

/// Parameter list of a function declarator. A trailing ellipsis is recorded
/// as a flag; it is not a parameter of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamList<T> {
    pub params: Vec<ParamDecl<T>>,
    pub variadic: bool,
    pub position: Position,
}

impl ParamList<()> {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> ParamList<()> {
        assert_eq!(pair.as_rule(), Rule::paramList);

        let (line, col) = pair.line_col();

        let mut params = vec![];
        let mut variadic = false;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::paramDecl => params.push(ParamDecl::from_pair(inner, file)),
                Rule::ellipsis => variadic = true,
                rule => unreachable!("unexpected rule {rule:?} in parameter list"),
            }
        }

        ParamList {
            params,
            variadic,
            position: (file.to_owned(), line, col),
        }
    }
}
