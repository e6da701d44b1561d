//! Module for parsing programs of the accepted C subset.
//!
//! It contains all structs for the internal representation of a translation unit (i.e., the AST).
mod assignment;
mod binary_expr;
mod binary_op;
mod call;
mod compound;
mod decl_specifiers;
mod declaration;
mod declarator;
mod direct_declarator;
mod expr_stmt;
mod expression;
mod external_decl;
mod float;
mod function_def;
mod ident;
mod if_statement;
mod integer;
mod param_decl;
mod param_list;
mod parser;
mod return_stmt;
mod statement;
mod str;
mod type_specifier;
mod unary_expr;
mod unary_op;
mod while_loop;

pub use self::assignment::*;
pub use self::binary_expr::*;
pub use self::binary_op::*;
pub use self::call::*;
pub use self::compound::*;
pub use self::decl_specifiers::*;
pub use self::declaration::*;
pub use self::declarator::*;
pub use self::direct_declarator::*;
pub use self::expr_stmt::*;
pub use self::expression::*;
pub use self::external_decl::*;
pub use self::float::*;
pub use self::function_def::*;
pub use self::ident::*;
pub use self::if_statement::*;
pub use self::integer::*;
pub use self::param_decl::*;
pub use self::param_list::*;
pub use self::parser::*;
pub use self::return_stmt::*;
pub use self::statement::*;
pub use self::str::*;
pub use self::type_specifier::*;
pub use self::unary_expr::*;
pub use self::unary_op::*;
pub use self::while_loop::*;

use pest::iterators::Pairs;

/// A position within a file (i.e., file name, line and column).
pub type Position = (String, usize, usize);

/// AST of a single translation unit.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Ast<T> {
    items: Vec<ExternalDecl<T>>,
}

impl Ast<()> {
    /// Create a new AST from the parse result of a whole program.
    /// Note: This AST is not name- or type-correct by default.
    pub fn from_program(program: Pairs<Rule>, file: &str) -> Ast<()> {
        let mut items = vec![];

        for pair in program {
            if pair.as_rule() == Rule::translationUnit {
                for item in pair.into_inner() {
                    items.push(ExternalDecl::from_pair(item, file));
                }
            }
        }

        Self { items }
    }
}

impl<T> Ast<T> {
    pub fn from_items(items: Vec<ExternalDecl<T>>) -> Ast<T> {
        Self { items }
    }

    pub fn items(&self) -> &[ExternalDecl<T>] {
        &self.items
    }
}
