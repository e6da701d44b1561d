use pest::iterators::Pair;

use super::{
    Compound, Declaration, ExprStmt, If, Position, Return, Rule, WhileLoop,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement<T> {
    Declaration(Declaration<T>),
    Compound(Compound<T>),
    Expression(ExprStmt<T>),
    If(If<T>),
    While(WhileLoop<T>),
    Return(Return<T>),
}

impl Statement<()> {
    pub fn from_pair(pair: Pair<Rule>, file: &str) -> Statement<()> {
        match pair.as_rule() {
            Rule::declaration => Statement::Declaration(Declaration::from_pair(pair, file)),
            Rule::compound => Statement::Compound(Compound::from_pair(pair, file)),
            Rule::exprStmt => Statement::Expression(ExprStmt::from_pair(pair, file)),
            Rule::ifStmt => Statement::If(If::from_pair(pair, file)),
            Rule::whileStmt => Statement::While(WhileLoop::from_pair(pair, file)),
            Rule::returnStmt => Statement::Return(Return::from_pair(pair, file)),
            rule => unreachable!("can not parse rule {rule:?} as a statement"),
        }
    }
}

impl<T> Statement<T>
where
    T: Clone,
{
    pub fn info(&self) -> T {
        match self {
            Statement::Declaration(Declaration { info, .. })
            | Statement::Compound(Compound { info, .. })
            | Statement::Expression(ExprStmt { info, .. })
            | Statement::If(If { info, .. })
            | Statement::While(WhileLoop { info, .. })
            | Statement::Return(Return { info, .. }) => info.clone(),
        }
    }
}

impl<T> Statement<T> {
    pub fn position(&self) -> Position {
        match self {
            Statement::Declaration(Declaration { position, .. })
            | Statement::Compound(Compound { position, .. })
            | Statement::Expression(ExprStmt { position, .. })
            | Statement::If(If { position, .. })
            | Statement::While(WhileLoop { position, .. })
            | Statement::Return(Return { position, .. }) => position.to_owned(),
        }
    }
}
