use pest::iterators::Pair;

use super::{Ident, ParamList, Position, Rule};

/// The identifier of a declarator, optionally followed by a parameter list
/// (which makes the declared name a function).
#[derive(Debug, Clone, PartialEq)]
pub struct DirectDeclarator<T> {
    pub ident: Ident<T>,
    pub params: Option<ParamList<T>>,
    pub position: Position,
}

impl DirectDeclarator<()> {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> DirectDeclarator<()> {
        assert_eq!(pair.as_rule(), Rule::directDeclarator);

        let (line, col) = pair.line_col();

        let mut inner = pair.into_inner();

        let ident = Ident::from_pair(
            inner
                .next()
                .unwrap_or_else(|| panic!("expected identifier in declarator at {line}:{col}")),
            file,
        );

        let params = inner.next().map(|list| ParamList::from_pair(list, file));

        DirectDeclarator {
            ident,
            params,
            position: (file.to_owned(), line, col),
        }
    }
}
