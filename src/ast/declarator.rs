use pest::iterators::Pair;

use super::{DirectDeclarator, Position, Rule};

#[derive(Debug, Clone, PartialEq)]
pub struct Declarator<T> {
    /// Number of `*` prefixes in front of the direct declarator.
    pub pointer_depth: usize,
    pub direct: DirectDeclarator<T>,
    pub position: Position,
}

impl Declarator<()> {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> Declarator<()> {
        assert_eq!(pair.as_rule(), Rule::declarator);

        let (line, col) = pair.line_col();

        let mut pointer_depth = 0;
        let mut direct = None;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::pointer => pointer_depth += 1,
                Rule::directDeclarator => direct = Some(DirectDeclarator::from_pair(inner, file)),
                rule => unreachable!("unexpected rule {rule:?} in declarator"),
            }
        }

        let Some(direct) = direct else {
            unreachable!("declarator without a direct declarator at {line}:{col}")
        };

        Declarator {
            pointer_depth,
            direct,
            position: (file.to_owned(), line, col),
        }
    }
}

impl<T> Declarator<T> {
    /// Name introduced by this declarator.
    pub fn name(&self) -> &str {
        &self.direct.ident.value
    }
}
