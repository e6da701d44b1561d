use pest::iterators::Pair;

use super::{Position, Rule, TypeSpecifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeQualifier {
    Const,
    Volatile,
}

/// The specifier/qualifier prefix of a declaration. Qualifiers are parsed and
/// kept, but carry no semantic weight in the accepted subset.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclSpecifiers {
    pub qualifiers: Vec<TypeQualifier>,
    pub specifier: TypeSpecifier,
    pub position: Position,
}

impl DeclSpecifiers {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> DeclSpecifiers {
        assert_eq!(pair.as_rule(), Rule::declSpecifiers);

        let (line, col) = pair.line_col();

        let mut qualifiers = vec![];
        let mut specifier = None;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::typeQualifier => qualifiers.push(match inner.as_str() {
                    "const" => TypeQualifier::Const,
                    "volatile" => TypeQualifier::Volatile,
                    qualifier => unreachable!("invalid type qualifier '{qualifier}'"),
                }),
                Rule::typeSpecifier => specifier = Some(TypeSpecifier::from_pair(inner, file)),
                rule => unreachable!("unexpected rule {rule:?} in declaration specifiers"),
            }
        }

        let Some(specifier) = specifier else {
            unreachable!("declaration specifiers without a type specifier at {line}:{col}")
        };

        DeclSpecifiers {
            qualifiers,
            specifier,
            position: (file.to_owned(), line, col),
        }
    }
}
