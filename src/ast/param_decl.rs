use pest::iterators::Pair;

use super::{DeclSpecifiers, Declarator, Position, Rule};

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl<T> {
    pub specifiers: DeclSpecifiers,
    pub declarator: Declarator<T>,
    pub position: Position,
}

impl ParamDecl<()> {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> ParamDecl<()> {
        assert_eq!(pair.as_rule(), Rule::paramDecl);

        let (line, col) = pair.line_col();

        let mut inner = pair.into_inner();

        let specifiers = DeclSpecifiers::from_pair(
            inner
                .next()
                .unwrap_or_else(|| panic!("expected specifiers in parameter at {line}:{col}")),
            file,
        );
        let declarator = Declarator::from_pair(
            inner
                .next()
                .unwrap_or_else(|| panic!("expected declarator in parameter at {line}:{col}")),
            file,
        );

        ParamDecl {
            specifiers,
            declarator,
            position: (file.to_owned(), line, col),
        }
    }
}

impl<T> ParamDecl<T> {
    pub fn name(&self) -> &str {
        self.declarator.name()
    }
}
