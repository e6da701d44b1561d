use pest::iterators::Pair;

use super::{Declaration, FunctionDef, Rule};

/// A top-level item of a translation unit.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalDecl<T> {
    Declaration(Declaration<T>),
    FunctionDef(FunctionDef<T>),
}

impl ExternalDecl<()> {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> ExternalDecl<()> {
        match pair.as_rule() {
            Rule::declaration => ExternalDecl::Declaration(Declaration::from_pair(pair, file)),
            Rule::functionDef => ExternalDecl::FunctionDef(FunctionDef::from_pair(pair, file)),
            rule => unreachable!("can not parse rule {rule:?} as an external declaration"),
        }
    }
}
