use std::fmt::Display;

use pest::iterators::Pair;

use super::{Position, Rule};

/// One of the scalar type keywords of the source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKeyword {
    Int,
    Float,
    Char,
    Bool,
    Void,
}

impl Display for TypeKeyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TypeKeyword::Int => "int",
            TypeKeyword::Float => "float",
            TypeKeyword::Char => "char",
            TypeKeyword::Bool => "bool",
            TypeKeyword::Void => "void",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpecifier {
    pub keyword: TypeKeyword,
    pub position: Position,
}

impl TypeSpecifier {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> TypeSpecifier {
        assert_eq!(pair.as_rule(), Rule::typeSpecifier);

        let (line, col) = pair.line_col();

        let keyword = match pair.as_str() {
            "int" => TypeKeyword::Int,
            "float" => TypeKeyword::Float,
            "char" => TypeKeyword::Char,
            "bool" => TypeKeyword::Bool,
            "void" => TypeKeyword::Void,
            specifier => unreachable!("invalid type specifier '{specifier}'"),
        };

        TypeSpecifier {
            keyword,
            position: (file.to_owned(), line, col),
        }
    }
}
