//! Type checker for the C subset.
//!
//! The checker runs after name resolution and attaches a [`TypeInfo`] to
//! every node. Statements carry a "statement type": the type of the values a
//! statement can `return`, with `void` meaning it can not return at all.
//! Compound statements fold their items with [`CType::merge`], which is how a
//! function definition verifies that every control path agrees with the
//! declared return type.
mod ctype;
mod error;
mod info;

pub use self::ctype::*;
pub use self::error::*;
pub use self::info::*;

use crate::{
    ast::{
        Assignment, Ast, BinaryExpr, Call, Comma, Compound, DeclSpecifiers, Declaration,
        Declarator, DirectDeclarator, ExprStmt, Expression, ExternalDecl, Float, FunctionDef,
        Ident, If, Integer, ParamDecl, ParamList, Return, Statement, Str, UnaryExpr, UnaryOp,
        WhileLoop,
    },
    symbols::{ScopePolicy, SymbolTable},
};

/// Result of type checking a single node.
type TResult<T> = Result<T, TypeError>;

/// Struct for type checking an AST.
///
/// Every statement that fails records its error and the walk continues, so a
/// single run reports as many errors as possible.
#[derive(Default)]
pub struct Typechecker {
    errors: Vec<TypeError>,
}

impl Typechecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Type check the AST and return it with type information attached to
    /// every node.
    pub fn check(mut self, ast: &Ast<()>) -> Result<Ast<TypeInfo>, Vec<TypeError>> {
        let mut table = SymbolTable::new();
        table.push();

        let mut items = vec![];

        for item in ast.items() {
            match item {
                ExternalDecl::Declaration(declaration) => {
                    match self.check_declaration(declaration, &mut table) {
                        Ok(declaration) => items.push(ExternalDecl::Declaration(declaration)),
                        Err(error) => self.errors.push(error),
                    }
                }
                ExternalDecl::FunctionDef(function) => {
                    match self.check_function_def(function, &mut table) {
                        Ok(function) => items.push(ExternalDecl::FunctionDef(function)),
                        Err(error) => self.errors.push(error),
                    }
                }
            }
        }

        if self.errors.is_empty() {
            Ok(Ast::from_items(items))
        } else {
            Err(self.errors)
        }
    }

    /// Assemble the declared type of a declarator and rebuild it with that
    /// type attached to its identifier. A declarator with a parameter list
    /// declares a function; a trailing ellipsis becomes the ellipsis sentinel
    /// at the end of the parameter type vector.
    fn check_declarator(
        specifiers: &DeclSpecifiers,
        declarator: &Declarator<()>,
    ) -> TResult<(CType, Declarator<TypeInfo>)> {
        let scalar = CType::scalar(
            specifiers.specifier.keyword.into(),
            declarator.pointer_depth,
        );

        let (ctype, params) = match &declarator.direct.params {
            None => (scalar, None),
            Some(list) => {
                let mut param_types = vec![];
                let mut params = vec![];

                for param in &list.params {
                    let (param_type, param_declarator) =
                        Self::check_declarator(&param.specifiers, &param.declarator)?;
                    param_types.push(param_type);
                    params.push(ParamDecl {
                        specifiers: param.specifiers.clone(),
                        declarator: param_declarator,
                        position: param.position.clone(),
                    });
                }

                if list.variadic {
                    param_types.push(CType::Simple(SimpleType::Ellipsis));
                }

                (
                    CType::Function {
                        params: param_types,
                        return_type: Box::new(scalar),
                    },
                    Some(ParamList {
                        params,
                        variadic: list.variadic,
                        position: list.position.clone(),
                    }),
                )
            }
        };

        let declarator = Declarator {
            pointer_depth: declarator.pointer_depth,
            direct: DirectDeclarator {
                ident: Ident {
                    value: declarator.direct.ident.value.clone(),
                    position: declarator.direct.ident.position.clone(),
                    info: TypeInfo {
                        ctype: ctype.clone(),
                    },
                },
                params,
                position: declarator.direct.position.clone(),
            },
            position: declarator.position.clone(),
        };

        Ok((ctype, declarator))
    }

    fn check_declaration(
        &mut self,
        declaration: &Declaration<()>,
        table: &mut SymbolTable<CType>,
    ) -> TResult<Declaration<TypeInfo>> {
        let (ctype, declarator) =
            Self::check_declarator(&declaration.specifiers, &declaration.declarator)?;

        if ctype.is_function() && table.depth() > 1 {
            return Err(TypeError {
                message: format!(
                    "function '{}' must be declared at global scope",
                    declaration.name()
                ),
                position: declaration.position.clone(),
            });
        }

        if !table.insert(declaration.name(), ctype.clone()) {
            return Err(TypeError {
                message: format!("'{}' is declared twice in this scope", declaration.name()),
                position: declaration.position.clone(),
            });
        }

        Ok(Declaration {
            specifiers: declaration.specifiers.clone(),
            declarator,
            position: declaration.position.clone(),
            info: TypeInfo { ctype },
        })
    }

    fn check_function_def(
        &mut self,
        function: &FunctionDef<()>,
        table: &mut SymbolTable<CType>,
    ) -> TResult<FunctionDef<TypeInfo>> {
        let Some(param_list) = &function.declarator.direct.params else {
            return Err(TypeError {
                message: format!(
                    "definition of '{}' requires a parameter list",
                    function.name()
                ),
                position: function.position.clone(),
            });
        };

        // declarations may record an ellipsis, definitions may not
        if param_list.variadic {
            return Err(TypeError {
                message: format!(
                    "ellipsis is not allowed in the definition of '{}'",
                    function.name()
                ),
                position: function.position.clone(),
            });
        }

        let (ctype, declarator) =
            Self::check_declarator(&function.specifiers, &function.declarator)?;

        let CType::Function {
            params: param_types,
            return_type,
        } = ctype.clone()
        else {
            unreachable!("function definition '{}' without a function type", function.name())
        };

        if !table.insert(function.name(), ctype.clone()) {
            return Err(TypeError {
                message: format!(
                    "'{}' is declared twice at global scope",
                    function.name()
                ),
                position: function.position.clone(),
            });
        }

        table.push();

        for (param, param_type) in param_list.params.iter().zip(&param_types) {
            if !table.insert(param.name(), param_type.clone()) {
                table.pop();
                return Err(TypeError {
                    message: format!(
                        "parameter '{}' of '{}' is declared twice",
                        param.name(),
                        function.name()
                    ),
                    position: param.position.clone(),
                });
            }
        }

        // make the function visible to its own body for recursion
        table.insert(function.name(), ctype.clone());

        let body = self.check_compound(&function.body, table, ScopePolicy::InheritFrame);

        table.pop();

        let body_type = body.info.ctype.clone();
        if body_type != *return_type {
            return Err(TypeError {
                message: format!(
                    "'{}' is declared to return '{return_type}' but its body returns '{body_type}'",
                    function.name()
                ),
                position: function.position.clone(),
            });
        }

        Ok(FunctionDef {
            specifiers: function.specifiers.clone(),
            declarator,
            body,
            position: function.position.clone(),
            info: TypeInfo { ctype },
        })
    }

    /// Fold the statement types of all items with [`CType::merge`]; the
    /// result becomes the statement type of the compound itself.
    fn check_compound(
        &mut self,
        compound: &Compound<()>,
        table: &mut SymbolTable<CType>,
        policy: ScopePolicy,
    ) -> Compound<TypeInfo> {
        if policy == ScopePolicy::NewFrame {
            table.push();
        }

        let mut statement_type = CType::Simple(SimpleType::Void);
        let mut items = vec![];

        for item in &compound.items {
            match self.check_statement(item, table) {
                Ok(statement) => {
                    let item_type = statement.info().ctype;
                    match statement_type.merge(&item_type) {
                        Some(merged) => statement_type = merged,
                        None => self.errors.push(TypeError {
                            message: format!(
                                "incompatible statement types '{statement_type}' and '{item_type}'"
                            ),
                            position: statement.position(),
                        }),
                    }
                    items.push(statement);
                }
                Err(error) => self.errors.push(error),
            }
        }

        if policy == ScopePolicy::NewFrame {
            table.pop();
        }

        Compound {
            items,
            position: compound.position.clone(),
            info: TypeInfo {
                ctype: statement_type,
            },
        }
    }

    fn check_statement(
        &mut self,
        statement: &Statement<()>,
        table: &mut SymbolTable<CType>,
    ) -> TResult<Statement<TypeInfo>> {
        Ok(match statement {
            Statement::Declaration(declaration) => {
                Statement::Declaration(self.check_declaration(declaration, table)?)
            }
            Statement::Compound(compound) => {
                Statement::Compound(self.check_compound(compound, table, ScopePolicy::NewFrame))
            }
            Statement::Expression(statement) => {
                Statement::Expression(self.check_expr_stmt(statement, table)?)
            }
            Statement::If(if_statement) => Statement::If(self.check_if(if_statement, table)?),
            Statement::While(while_loop) => {
                Statement::While(self.check_while_loop(while_loop, table)?)
            }
            Statement::Return(return_statement) => {
                Statement::Return(self.check_return(return_statement, table)?)
            }
        })
    }

    /// An expression statement contributes `void` to its surrounding
    /// compound regardless of the type of its expression.
    fn check_expr_stmt(
        &mut self,
        statement: &ExprStmt<()>,
        table: &mut SymbolTable<CType>,
    ) -> TResult<ExprStmt<TypeInfo>> {
        let expr = match &statement.expr {
            Some(expr) => Some(self.check_expression(expr, table)?),
            None => None,
        };

        Ok(ExprStmt {
            expr,
            position: statement.position.clone(),
            info: TypeInfo {
                ctype: CType::Simple(SimpleType::Void),
            },
        })
    }

    fn check_if(
        &mut self,
        if_statement: &If<()>,
        table: &mut SymbolTable<CType>,
    ) -> TResult<If<TypeInfo>> {
        let condition = self.check_expression(&if_statement.condition, table)?;
        let condition_type = condition.info().ctype;

        if condition_type != CType::Simple(SimpleType::Bool) {
            return Err(TypeError {
                message: format!("invalid type '{condition_type}' of condition"),
                position: if_statement.condition.position(),
            });
        }

        let then_branch = self.check_statement(&if_statement.then_branch, table)?;
        let mut node_type = then_branch.info().ctype;

        let else_branch = match &if_statement.else_branch {
            Some(else_branch) => {
                let else_branch = self.check_statement(else_branch, table)?;
                let else_type = else_branch.info().ctype;

                let Some(merged) = node_type.merge(&else_type) else {
                    return Err(TypeError {
                        message: format!(
                            "if branches have incompatible types '{node_type}' and '{else_type}'"
                        ),
                        position: if_statement.position.clone(),
                    });
                };
                node_type = merged;

                Some(Box::new(else_branch))
            }
            None => None,
        };

        Ok(If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch,
            position: if_statement.position.clone(),
            info: TypeInfo { ctype: node_type },
        })
    }

    fn check_while_loop(
        &mut self,
        while_loop: &WhileLoop<()>,
        table: &mut SymbolTable<CType>,
    ) -> TResult<WhileLoop<TypeInfo>> {
        let condition = self.check_expression(&while_loop.condition, table)?;
        let condition_type = condition.info().ctype;

        if condition_type != CType::Simple(SimpleType::Bool) {
            return Err(TypeError {
                message: format!("invalid type '{condition_type}' of condition"),
                position: while_loop.condition.position(),
            });
        }

        let body = self.check_statement(&while_loop.body, table)?;
        let body_type = body.info().ctype;

        Ok(WhileLoop {
            condition,
            body: Box::new(body),
            position: while_loop.position.clone(),
            info: TypeInfo { ctype: body_type },
        })
    }

    fn check_return(
        &mut self,
        return_statement: &Return<()>,
        table: &mut SymbolTable<CType>,
    ) -> TResult<Return<TypeInfo>> {
        let (expr, ctype) = match &return_statement.expr {
            Some(expr) => {
                let expr = self.check_expression(expr, table)?;
                let ctype = expr.info().ctype;
                (Some(expr), ctype)
            }
            None => (None, CType::Simple(SimpleType::Void)),
        };

        Ok(Return {
            expr,
            position: return_statement.position.clone(),
            info: TypeInfo { ctype },
        })
    }

    fn check_expression(
        &mut self,
        expression: &Expression<()>,
        table: &mut SymbolTable<CType>,
    ) -> TResult<Expression<TypeInfo>> {
        Ok(match expression {
            Expression::Integer(Integer {
                value, position, ..
            }) => Expression::Integer(Integer {
                value: *value,
                position: position.clone(),
                info: TypeInfo {
                    ctype: CType::Simple(SimpleType::Int),
                },
            }),
            Expression::Float(Float {
                value, position, ..
            }) => Expression::Float(Float {
                value: *value,
                position: position.clone(),
                info: TypeInfo {
                    ctype: CType::Simple(SimpleType::Float),
                },
            }),
            Expression::Str(Str {
                value, position, ..
            }) => Expression::Str(Str {
                value: value.clone(),
                position: position.clone(),
                info: TypeInfo {
                    ctype: CType::Pointer {
                        depth: 1,
                        element: SimpleType::Char,
                    },
                },
            }),
            Expression::Ident(ident) => Expression::Ident(Self::check_identifier(ident, table)?),
            Expression::Assignment(assignment) => {
                Expression::Assignment(Box::new(self.check_assignment(assignment, table)?))
            }
            Expression::Binary(binary) => {
                Expression::Binary(Box::new(self.check_binary(binary, table)?))
            }
            Expression::Unary(unary) => {
                Expression::Unary(Box::new(self.check_unary(unary, table)?))
            }
            Expression::Call(call) => Expression::Call(Box::new(self.check_call(call, table)?)),
            Expression::Comma(comma) => Expression::Comma(self.check_comma(comma, table)?),
        })
    }

    fn check_identifier(
        identifier: &Ident<()>,
        table: &SymbolTable<CType>,
    ) -> TResult<Ident<TypeInfo>> {
        match table.lookup(&identifier.value) {
            Some(ctype) => Ok(Ident {
                value: identifier.value.clone(),
                position: identifier.position.clone(),
                info: TypeInfo {
                    ctype: ctype.clone(),
                },
            }),
            None => Err(TypeError {
                message: format!("undefined identifier '{}'", identifier.value),
                position: identifier.position.clone(),
            }),
        }
    }

    fn check_assignment(
        &mut self,
        assignment: &Assignment<()>,
        table: &mut SymbolTable<CType>,
    ) -> TResult<Assignment<TypeInfo>> {
        let lhs = self.check_expression(&assignment.lhs, table)?;
        let rhs = self.check_expression(&assignment.rhs, table)?;

        let l_type = lhs.info().ctype;
        let r_type = rhs.info().ctype;

        if l_type != r_type {
            return Err(TypeError {
                message: format!("can not assign a value of type '{r_type}' to '{l_type}'"),
                position: assignment.position.clone(),
            });
        }

        Ok(Assignment {
            lhs,
            op: assignment.op,
            rhs,
            position: assignment.position.clone(),
            info: TypeInfo { ctype: l_type },
        })
    }

    fn check_binary(
        &mut self,
        binary: &BinaryExpr<()>,
        table: &mut SymbolTable<CType>,
    ) -> TResult<BinaryExpr<TypeInfo>> {
        let lhs = self.check_expression(&binary.lhs, table)?;
        let rhs = self.check_expression(&binary.rhs, table)?;

        let l_type = lhs.info().ctype;
        let r_type = rhs.info().ctype;

        if l_type != r_type {
            return Err(TypeError {
                message: format!(
                    "operands of '{}' do not match ('{l_type}' and '{r_type}')",
                    binary.op
                ),
                position: binary.position.clone(),
            });
        }

        let ctype = if binary.op.is_comparison() || binary.op.is_logical() {
            CType::Simple(SimpleType::Bool)
        } else {
            l_type
        };

        Ok(BinaryExpr {
            op: binary.op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            position: binary.position.clone(),
            info: TypeInfo { ctype },
        })
    }

    fn check_unary(
        &mut self,
        unary: &UnaryExpr<()>,
        table: &mut SymbolTable<CType>,
    ) -> TResult<UnaryExpr<TypeInfo>> {
        let operand = self.check_expression(&unary.operand, table)?;
        let operand_type = operand.info().ctype;

        let ctype = match unary.op {
            UnaryOp::LogicalNot => {
                if operand_type != CType::Simple(SimpleType::Bool) {
                    return Err(TypeError {
                        message: format!("invalid type '{operand_type}' for operator '!'"),
                        position: unary.position.clone(),
                    });
                }
                CType::Simple(SimpleType::Bool)
            }
            op => {
                if operand_type != CType::Simple(SimpleType::Int) {
                    return Err(TypeError {
                        message: format!("invalid type '{operand_type}' for operator '{op}'"),
                        position: unary.position.clone(),
                    });
                }
                CType::Simple(SimpleType::Int)
            }
        };

        Ok(UnaryExpr {
            op: unary.op,
            operand: Box::new(operand),
            position: unary.position.clone(),
            info: TypeInfo { ctype },
        })
    }

    fn check_call(
        &mut self,
        call: &Call<()>,
        table: &mut SymbolTable<CType>,
    ) -> TResult<Call<TypeInfo>> {
        let Expression::Ident(ident) = call.callee.as_ref() else {
            return Err(TypeError {
                message: "called value is not a function name".to_owned(),
                position: call.position.clone(),
            });
        };

        let callee = self.check_expression(&call.callee, table)?;

        let CType::Function {
            params,
            return_type,
        } = callee.info().ctype
        else {
            return Err(TypeError {
                message: format!("'{}' is not a function", ident.value),
                position: call.position.clone(),
            });
        };

        let mut args = vec![];
        for arg in &call.args {
            args.push(self.check_expression(arg, table)?);
        }

        let variadic = params.last() == Some(&CType::Simple(SimpleType::Ellipsis));
        let fixed = if variadic {
            &params[..params.len() - 1]
        } else {
            &params[..]
        };

        let arity_ok = if variadic {
            args.len() >= fixed.len()
        } else {
            args.len() == fixed.len()
        };
        if !arity_ok {
            return Err(TypeError {
                message: format!(
                    "incompatible number of arguments in call to '{}' (expected {}{}, got {})",
                    ident.value,
                    fixed.len(),
                    if variadic { " or more" } else { "" },
                    args.len()
                ),
                position: call.position.clone(),
            });
        }

        for (arg, param) in args.iter().zip(fixed) {
            let arg_type = arg.info().ctype;
            if arg_type != *param {
                return Err(TypeError {
                    message: format!(
                        "incompatible argument type in call to '{}': expected '{param}', got '{arg_type}'",
                        ident.value
                    ),
                    position: arg.position(),
                });
            }
        }

        Ok(Call {
            callee: Box::new(callee),
            args,
            position: call.position.clone(),
            info: TypeInfo {
                ctype: *return_type,
            },
        })
    }

    /// A comma sequence takes the type of its last element.
    fn check_comma(
        &mut self,
        comma: &Comma<()>,
        table: &mut SymbolTable<CType>,
    ) -> TResult<Comma<TypeInfo>> {
        let mut exprs = vec![];
        for expr in &comma.exprs {
            exprs.push(self.check_expression(expr, table)?);
        }

        let ctype = exprs
            .last()
            .map(|expr| expr.info().ctype)
            .unwrap_or(CType::Simple(SimpleType::Void));

        Ok(Comma {
            exprs,
            position: comma.position.clone(),
            info: TypeInfo { ctype },
        })
    }
}

/// Names and types introduced at the global scope, for the verbose listing
/// of the driver.
pub fn global_bindings(ast: &Ast<TypeInfo>) -> Vec<(String, CType)> {
    ast.items()
        .iter()
        .map(|item| match item {
            ExternalDecl::Declaration(declaration) => (
                declaration.name().to_owned(),
                declaration.info.ctype.clone(),
            ),
            ExternalDecl::FunctionDef(function) => {
                (function.name().to_owned(), function.info.ctype.clone())
            }
        })
        .collect()
}
