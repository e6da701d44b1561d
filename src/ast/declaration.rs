use pest::iterators::Pair;

use super::{DeclSpecifiers, Declarator, Position, Rule};

/// A declaration of a scalar, pointer or function name.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration<T> {
    pub specifiers: DeclSpecifiers,
    pub declarator: Declarator<T>,
    pub position: Position,
    pub info: T,
}

impl Declaration<()> {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> Declaration<()> {
        assert_eq!(pair.as_rule(), Rule::declaration);

        let (line, col) = pair.line_col();

        let mut inner = pair.into_inner();

        let specifiers = DeclSpecifiers::from_pair(
            inner
                .next()
                .unwrap_or_else(|| panic!("expected specifiers in declaration at {line}:{col}")),
            file,
        );
        let declarator = Declarator::from_pair(
            inner
                .next()
                .unwrap_or_else(|| panic!("expected declarator in declaration at {line}:{col}")),
            file,
        );

        Declaration {
            specifiers,
            declarator,
            position: (file.to_owned(), line, col),
            info: (),
        }
    }
}

impl<T> Declaration<T> {
    pub fn name(&self) -> &str {
        self.declarator.name()
    }
}
