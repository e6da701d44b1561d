use pest::iterators::Pair;

use super::{Compound, DeclSpecifiers, Declarator, Position, Rule};

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef<T> {
    pub specifiers: DeclSpecifiers,
    pub declarator: Declarator<T>,
    pub body: Compound<T>,
    pub position: Position,
    pub info: T,
}

impl FunctionDef<()> {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> FunctionDef<()> {
        assert_eq!(pair.as_rule(), Rule::functionDef);

        let (line, col) = pair.line_col();

        let mut inner = pair.into_inner();

        let specifiers = DeclSpecifiers::from_pair(
            inner.next().unwrap_or_else(|| {
                panic!("expected specifiers in function definition at {line}:{col}")
            }),
            file,
        );
        let declarator = Declarator::from_pair(
            inner.next().unwrap_or_else(|| {
                panic!("expected declarator in function definition at {line}:{col}")
            }),
            file,
        );
        let body = Compound::from_pair(
            inner
                .next()
                .unwrap_or_else(|| panic!("expected body in function definition at {line}:{col}")),
            file,
        );

        FunctionDef {
            specifiers,
            declarator,
            body,
            position: (file.to_owned(), line, col),
            info: (),
        }
    }
}

impl<T> FunctionDef<T> {
    pub fn name(&self) -> &str {
        self.declarator.name()
    }
}
