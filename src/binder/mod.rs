//! Name resolution for the C subset.
//!
//! This is the first of the two semantic passes: it verifies that every
//! identifier resolves to a declaration in some enclosing scope and that no
//! name is introduced twice in the same frame. Declarations have to see
//! their parameters at the same scope the body does, which is why a function
//! definition keeps its parameter frame open while the body is walked.
mod error;

pub use self::error::*;

use crate::{
    ast::{
        Ast, Compound, Declaration, Declarator, Expression, ExternalDecl, FunctionDef, Position,
        Statement,
    },
    symbols::{ScopePolicy, SymbolTable},
};

/// How [`Binder::bind_declarator`] treats the frame it opens for a parameter
/// list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclaratorMode {
    /// Parameter names live in a throwaway frame that is popped right away.
    Standalone,
    /// Function-definition prologue: the parameter frame is left open so the
    /// body inherits it. The caller pops it.
    FunctionPrologue,
}

/// Struct for resolving all names within an AST.
///
/// Every failure is recorded and the walk continues, so a single run reports
/// as many binding errors as possible.
#[derive(Default)]
pub struct Binder {
    errors: Vec<BindError>,
}

impl Binder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(mut self, ast: &Ast<()>) -> Result<(), Vec<BindError>> {
        let mut table = SymbolTable::new();
        table.push();

        for item in ast.items() {
            match item {
                ExternalDecl::Declaration(declaration) => {
                    self.bind_declarator(&declaration.declarator, &mut table, DeclaratorMode::Standalone)
                }
                ExternalDecl::FunctionDef(function) => {
                    self.bind_function_def(function, &mut table)
                }
            }
        }

        table.pop();

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    /// Record a declared name in the innermost frame. A duplicate names the
    /// line of the previous declaration.
    fn declare(&mut self, name: &str, position: &Position, table: &mut SymbolTable<Position>) {
        let previous = table.lookup_current(name).map(|(_, line, _)| *line);

        if table.insert(name, position.clone()) {
            return;
        }

        let previous = previous.unwrap_or_default();
        self.errors.push(BindError {
            message: format!(
                "'{name}' is declared twice in this scope (previous declaration on line {previous})"
            ),
            position: position.clone(),
        });
    }

    fn bind_declarator(
        &mut self,
        declarator: &Declarator<()>,
        table: &mut SymbolTable<Position>,
        mode: DeclaratorMode,
    ) {
        self.declare(
            declarator.name(),
            &declarator.direct.ident.position,
            table,
        );

        let Some(params) = &declarator.direct.params else {
            if mode == DeclaratorMode::FunctionPrologue {
                table.push();
            }
            return;
        };

        table.push();
        for param in &params.params {
            self.declare(
                param.name(),
                &param.declarator.direct.ident.position,
                table,
            );
        }
        if mode == DeclaratorMode::Standalone {
            table.pop();
        }
    }

    fn bind_function_def(&mut self, function: &FunctionDef<()>, table: &mut SymbolTable<Position>) {
        self.bind_declarator(
            &function.declarator,
            table,
            DeclaratorMode::FunctionPrologue,
        );

        // the body shares the parameter frame instead of opening its own
        self.bind_compound(&function.body, table, ScopePolicy::InheritFrame);

        table.pop();
    }

    fn bind_compound(
        &mut self,
        compound: &Compound<()>,
        table: &mut SymbolTable<Position>,
        policy: ScopePolicy,
    ) {
        if policy == ScopePolicy::NewFrame {
            table.push();
        }

        for item in &compound.items {
            self.bind_statement(item, table);
        }

        if policy == ScopePolicy::NewFrame {
            table.pop();
        }
    }

    fn bind_statement(&mut self, statement: &Statement<()>, table: &mut SymbolTable<Position>) {
        match statement {
            Statement::Declaration(Declaration { declarator, .. }) => {
                self.bind_declarator(declarator, table, DeclaratorMode::Standalone)
            }
            Statement::Compound(compound) => {
                self.bind_compound(compound, table, ScopePolicy::NewFrame)
            }
            Statement::Expression(statement) => {
                if let Some(expr) = &statement.expr {
                    self.bind_expression(expr, table);
                }
            }
            Statement::If(if_statement) => {
                self.bind_expression(&if_statement.condition, table);
                self.bind_statement(&if_statement.then_branch, table);
                if let Some(else_branch) = &if_statement.else_branch {
                    self.bind_statement(else_branch, table);
                }
            }
            Statement::While(while_loop) => {
                self.bind_expression(&while_loop.condition, table);
                self.bind_statement(&while_loop.body, table);
            }
            Statement::Return(return_statement) => {
                if let Some(expr) = &return_statement.expr {
                    self.bind_expression(expr, table);
                }
            }
        }
    }

    fn bind_expression(&mut self, expression: &Expression<()>, table: &SymbolTable<Position>) {
        match expression {
            Expression::Ident(ident) => {
                if table.lookup(&ident.value).is_none() {
                    self.errors.push(BindError {
                        message: format!("undefined identifier '{}'", ident.value),
                        position: ident.position.clone(),
                    });
                }
            }
            Expression::Integer(_) | Expression::Float(_) | Expression::Str(_) => {}
            Expression::Assignment(assignment) => {
                self.bind_expression(&assignment.lhs, table);
                self.bind_expression(&assignment.rhs, table);
            }
            Expression::Binary(binary) => {
                self.bind_expression(&binary.lhs, table);
                self.bind_expression(&binary.rhs, table);
            }
            Expression::Unary(unary) => self.bind_expression(&unary.operand, table),
            Expression::Call(call) => {
                self.bind_expression(&call.callee, table);
                for arg in &call.args {
                    self.bind_expression(arg, table);
                }
            }
            Expression::Comma(comma) => {
                for expr in &comma.exprs {
                    self.bind_expression(expr, table);
                }
            }
        }
    }
}
