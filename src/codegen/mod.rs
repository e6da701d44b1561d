//! Lowering of the type-correct AST into the IR.
//!
//! You should run the binder and the type checker beforehand; lowering
//! trusts the attached type information. Every function is canonicalised and
//! verified right after its body has been emitted.
mod error;

pub use self::error::*;

use crate::{
    ast::{
        AssignOp, Assignment, Ast, BinaryExpr, BinaryOp, Call, Compound, Declaration, ExprStmt,
        Expression, ExternalDecl, Float, FunctionDef, Ident, If, Integer, Return, Statement, Str,
        UnaryExpr, UnaryOp, WhileLoop,
    },
    ir::{
        verify_function, BinOp, Builder, FuncId, FuncParam, Function, IcmpPred, IrType, Module,
        UnOp, Value,
    },
    symbols::{ScopePolicy, SymbolTable},
    typechecker::{CType, SimpleType, TypeInfo},
};

type CResult<T> = Result<T, CodegenError>;

/// IR type of a value type. Ellipsis and function types never lower here:
/// the former is a declaration-level flag, the latter only occurs behind a
/// signature.
fn ir_type(ctype: &CType) -> IrType {
    match ctype {
        CType::Simple(SimpleType::Int) => IrType::I32,
        CType::Simple(SimpleType::Float) => IrType::F32,
        CType::Simple(SimpleType::Char) => IrType::I8,
        CType::Simple(SimpleType::Bool) => IrType::I1,
        CType::Simple(SimpleType::Void) => IrType::Void,
        CType::Simple(SimpleType::Ellipsis) => unreachable!("ellipsis is not a value type"),
        CType::Pointer { depth, element } => {
            let mut ty = ir_type(&CType::Simple(*element));
            for _ in 0..*depth {
                ty = ty.ptr_to();
            }
            ty
        }
        CType::Function { .. } => unreachable!("function types lower through their signatures"),
    }
}

/// Parameter types, return type and variadic flag of a function type. The
/// ellipsis sets the flag and is dropped from the parameters.
fn signature(ctype: &CType) -> Option<(Vec<IrType>, IrType, bool)> {
    let CType::Function {
        params,
        return_type,
    } = ctype
    else {
        return None;
    };

    let variadic = params.last() == Some(&CType::Simple(SimpleType::Ellipsis));
    let fixed = if variadic {
        &params[..params.len() - 1]
    } else {
        &params[..]
    };

    Some((fixed.iter().map(ir_type).collect(), ir_type(return_type), variadic))
}

/// Lowers a translation unit into an IR module.
///
/// Local variables live in stack slots; an identifier use loads from its
/// slot, an assignment stores to it. Mem-to-register promotion cleans this
/// up afterwards.
#[derive(Default)]
pub struct Codegen {
    module: Module,
    builder: Builder,
    variables: SymbolTable<Value>,
    functions: SymbolTable<FuncId>,
}

impl Codegen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lower(mut self, ast: &Ast<TypeInfo>) -> Result<Module, CodegenError> {
        self.variables.push();
        self.functions.push();

        for item in ast.items() {
            match item {
                ExternalDecl::Declaration(declaration) => {
                    self.lower_global_declaration(declaration)?
                }
                ExternalDecl::FunctionDef(function) => self.lower_function_def(function)?,
            }
        }

        Ok(self.module)
    }

    fn func(&self) -> FuncId {
        let Some(func) = self.builder.function() else {
            unreachable!("lowering a statement outside a function")
        };
        func
    }

    fn lower_global_declaration(&mut self, declaration: &Declaration<TypeInfo>) -> CResult<()> {
        let ctype = &declaration.info.ctype;

        // function declaration: external linkage, no body
        if let Some((param_types, ret, variadic)) = signature(ctype) {
            let names = declaration
                .declarator
                .direct
                .params
                .as_ref()
                .map(|list| {
                    list.params
                        .iter()
                        .map(|param| param.name().to_owned())
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();

            let params = names
                .into_iter()
                .zip(param_types)
                .map(|(name, ty)| FuncParam { name, ty })
                .collect();

            let func = self
                .module
                .add_function(Function::new(declaration.name(), params, ret, variadic));
            self.functions.insert(declaration.name(), func);
            return Ok(());
        }

        let ty = ir_type(ctype);
        let global = self.module.add_global(declaration.name(), ty);
        self.variables
            .insert(declaration.name(), Value::Global(global));
        Ok(())
    }

    fn lower_function_def(&mut self, function: &FunctionDef<TypeInfo>) -> CResult<()> {
        let Some((param_types, ret, variadic)) = signature(&function.info.ctype) else {
            return Err(CodegenError {
                message: format!("'{}' does not have a function type", function.name()),
                position: Some(function.position.clone()),
            });
        };

        let Some(param_list) = &function.declarator.direct.params else {
            return Err(CodegenError {
                message: format!("definition of '{}' has no parameter list", function.name()),
                position: Some(function.position.clone()),
            });
        };

        // formals are named after their source names
        let params = param_list
            .params
            .iter()
            .zip(&param_types)
            .map(|(param, ty)| FuncParam {
                name: param.name().to_owned(),
                ty: ty.clone(),
            })
            .collect();

        let func = self
            .module
            .add_function(Function::new(function.name(), params, ret.clone(), variadic));
        self.functions.insert(function.name(), func);

        let entry = self.module.function_mut(func).add_block("entry");
        self.builder.position_at_end(func, entry);

        self.variables.push();

        // spill every formal into a stack slot
        for (index, param) in param_list.params.iter().enumerate() {
            let slot =
                self.builder
                    .build_alloca(&mut self.module, param_types[index].clone(), param.name());
            self.builder
                .build_store(&mut self.module, Value::Param(index), slot.clone());
            self.variables.insert(param.name(), slot);
        }

        self.lower_compound(&function.body, ScopePolicy::InheritFrame)?;

        if ret == IrType::Void {
            self.builder.build_ret(&mut self.module, None);
        }

        self.variables.pop();

        self.module.function_mut(func).canonicalize();
        verify_function(&self.module, func)?;

        Ok(())
    }

    fn lower_compound(&mut self, compound: &Compound<TypeInfo>, policy: ScopePolicy) -> CResult<()> {
        if policy == ScopePolicy::NewFrame {
            self.variables.push();
        }

        for item in &compound.items {
            self.lower_statement(item)?;
        }

        if policy == ScopePolicy::NewFrame {
            self.variables.pop();
        }

        Ok(())
    }

    fn lower_statement(&mut self, statement: &Statement<TypeInfo>) -> CResult<()> {
        match statement {
            Statement::Declaration(declaration) => self.lower_local_declaration(declaration),
            Statement::Compound(compound) => self.lower_compound(compound, ScopePolicy::NewFrame),
            Statement::Expression(ExprStmt { expr, .. }) => {
                if let Some(expr) = expr {
                    self.lower_expression(expr)?;
                }
                Ok(())
            }
            Statement::If(if_statement) => self.lower_if(if_statement),
            Statement::While(while_loop) => self.lower_while(while_loop),
            Statement::Return(return_statement) => self.lower_return(return_statement),
        }
    }

    fn lower_local_declaration(&mut self, declaration: &Declaration<TypeInfo>) -> CResult<()> {
        let ty = ir_type(&declaration.info.ctype);
        let slot = self
            .builder
            .build_alloca(&mut self.module, ty, declaration.name());
        self.variables.insert(declaration.name(), slot);
        Ok(())
    }

    fn lower_return(&mut self, return_statement: &Return<TypeInfo>) -> CResult<()> {
        let value = match &return_statement.expr {
            Some(expr) => Some(self.lower_expression(expr)?),
            None => None,
        };
        self.builder.build_ret(&mut self.module, value);
        Ok(())
    }

    fn lower_if(&mut self, if_statement: &If<TypeInfo>) -> CResult<()> {
        let condition = self.lower_expression(&if_statement.condition)?;

        let func = self.func();
        let function = self.module.function_mut(func);

        let then_block = function.add_block("then");
        // created now, scheduled once their contents are ready
        let else_block = if_statement
            .else_branch
            .as_ref()
            .map(|_| function.create_block("else"));
        let merge_block = function.create_block("merge");

        self.builder.build_cond_br(
            &mut self.module,
            condition,
            then_block,
            else_block.unwrap_or(merge_block),
        );

        self.builder.position_at_end(func, then_block);
        self.lower_statement(&if_statement.then_branch)?;
        self.builder.build_br(&mut self.module, merge_block);

        if let (Some(else_branch), Some(else_block)) = (&if_statement.else_branch, else_block) {
            self.module.function_mut(func).append_block(else_block);
            self.builder.position_at_end(func, else_block);
            self.lower_statement(else_branch)?;
            self.builder.build_br(&mut self.module, merge_block);
        }

        self.module.function_mut(func).append_block(merge_block);
        self.builder.position_at_end(func, merge_block);

        Ok(())
    }

    fn lower_while(&mut self, while_loop: &WhileLoop<TypeInfo>) -> CResult<()> {
        let func = self.func();
        let function = self.module.function_mut(func);

        let cond_block = function.add_block("cond");
        let body_block = function.add_block("body");
        let merge_block = function.add_block("merge");

        self.builder.build_br(&mut self.module, cond_block);

        self.builder.position_at_end(func, cond_block);
        let condition = self.lower_expression(&while_loop.condition)?;
        self.builder
            .build_cond_br(&mut self.module, condition, body_block, merge_block);

        self.builder.position_at_end(func, body_block);
        self.lower_statement(&while_loop.body)?;
        self.builder.build_br(&mut self.module, cond_block);

        self.builder.position_at_end(func, merge_block);
        Ok(())
    }

    fn lower_expression(&mut self, expression: &Expression<TypeInfo>) -> CResult<Value> {
        match expression {
            Expression::Integer(Integer { value, .. }) => Ok(Value::const_i32(*value)),
            Expression::Float(Float { value, .. }) => Ok(Value::ConstFloat(*value)),
            Expression::Str(Str { value, .. }) => {
                let literal = self.module.intern_string(value);
                Ok(Value::Str(literal))
            }
            Expression::Ident(ident) => {
                let slot = self.lvalue(ident)?;
                Ok(self.builder.build_load(&mut self.module, slot))
            }
            Expression::Assignment(assignment) => self.lower_assignment(assignment),
            Expression::Binary(binary) => self.lower_binary(binary),
            Expression::Unary(unary) => self.lower_unary(unary),
            Expression::Call(call) => self.lower_call(call),
            Expression::Comma(comma) => {
                let mut value = Value::const_i32(0);
                for expr in &comma.exprs {
                    value = self.lower_expression(expr)?;
                }
                Ok(value)
            }
        }
    }

    /// Location of a named variable: its stack slot, or the global it names.
    fn lvalue(&self, ident: &Ident<TypeInfo>) -> CResult<Value> {
        match self.variables.lookup(&ident.value) {
            Some(slot) => Ok(slot.clone()),
            None => Err(CodegenError {
                message: format!("no storage for identifier '{}'", ident.value),
                position: Some(ident.position.clone()),
            }),
        }
    }

    fn lower_assignment(&mut self, assignment: &Assignment<TypeInfo>) -> CResult<Value> {
        let Expression::Ident(ident) = &assignment.lhs else {
            return Err(CodegenError {
                message: "left-hand side of an assignment has to be an identifier".to_owned(),
                position: Some(assignment.position.clone()),
            });
        };

        let location = self.lvalue(ident)?;
        let rhs = self.lower_expression(&assignment.rhs)?;

        if assignment.op == AssignOp::Assign {
            self.builder
                .build_store(&mut self.module, rhs.clone(), location);
            return Ok(rhs);
        }

        let op = match assignment.op {
            AssignOp::Add => BinOp::Add,
            AssignOp::Sub => BinOp::Sub,
            AssignOp::Mul => BinOp::Mul,
            AssignOp::Div => BinOp::SDiv,
            AssignOp::Rem => BinOp::SRem,
            AssignOp::Shl => BinOp::Shl,
            AssignOp::Shr => BinOp::AShr,
            AssignOp::And => BinOp::And,
            AssignOp::Xor => BinOp::Xor,
            AssignOp::Or => BinOp::Or,
            AssignOp::Assign => unreachable!(),
        };

        // a compound assignment yields the value the left-hand side had
        // before the operation
        let old = self.builder.build_load(&mut self.module, location.clone());
        let result = self
            .builder
            .build_binary(&mut self.module, op, old.clone(), rhs);
        self.builder.build_store(&mut self.module, result, location);

        Ok(old)
    }

    fn lower_binary(&mut self, binary: &BinaryExpr<TypeInfo>) -> CResult<Value> {
        let lhs = self.lower_expression(&binary.lhs)?;
        let rhs = self.lower_expression(&binary.rhs)?;

        let value = match binary.op {
            BinaryOp::Plus => self.builder.build_binary(&mut self.module, BinOp::Add, lhs, rhs),
            BinaryOp::Minus => self.builder.build_binary(&mut self.module, BinOp::Sub, lhs, rhs),
            BinaryOp::Mult => self.builder.build_binary(&mut self.module, BinOp::Mul, lhs, rhs),
            BinaryOp::Div => self.builder.build_binary(&mut self.module, BinOp::SDiv, lhs, rhs),
            BinaryOp::Mod => self.builder.build_binary(&mut self.module, BinOp::SRem, lhs, rhs),
            BinaryOp::Or => self.builder.build_binary(&mut self.module, BinOp::Or, lhs, rhs),
            BinaryOp::And => self.builder.build_binary(&mut self.module, BinOp::And, lhs, rhs),
            BinaryOp::Xor => self.builder.build_binary(&mut self.module, BinOp::Xor, lhs, rhs),
            BinaryOp::Shl => self.builder.build_binary(&mut self.module, BinOp::Shl, lhs, rhs),
            BinaryOp::Shr => self.builder.build_binary(&mut self.module, BinOp::AShr, lhs, rhs),
            // comparisons are signed
            BinaryOp::Gt => self.builder.build_icmp(&mut self.module, IcmpPred::Sgt, lhs, rhs),
            BinaryOp::Gte => self.builder.build_icmp(&mut self.module, IcmpPred::Sge, lhs, rhs),
            BinaryOp::Lt => self.builder.build_icmp(&mut self.module, IcmpPred::Slt, lhs, rhs),
            BinaryOp::Lte => self.builder.build_icmp(&mut self.module, IcmpPred::Sle, lhs, rhs),
            BinaryOp::Equal => self.builder.build_icmp(&mut self.module, IcmpPred::Eq, lhs, rhs),
            BinaryOp::NotEqual => self.builder.build_icmp(&mut self.module, IcmpPred::Ne, lhs, rhs),
            // no short-circuiting: these are plain bitwise operations on i1
            BinaryOp::LogicalOr => self.builder.build_binary(&mut self.module, BinOp::Or, lhs, rhs),
            BinaryOp::LogicalAnd => {
                self.builder.build_binary(&mut self.module, BinOp::And, lhs, rhs)
            }
        };

        Ok(value)
    }

    fn lower_unary(&mut self, unary: &UnaryExpr<TypeInfo>) -> CResult<Value> {
        match unary.op {
            UnaryOp::Plus => self.lower_expression(&unary.operand),
            UnaryOp::Neg => {
                let operand = self.lower_expression(&unary.operand)?;
                Ok(self.builder.build_unary(&mut self.module, UnOp::Neg, operand))
            }
            UnaryOp::Not | UnaryOp::LogicalNot => {
                let operand = self.lower_expression(&unary.operand)?;
                Ok(self.builder.build_unary(&mut self.module, UnOp::Not, operand))
            }
            op => {
                let Expression::Ident(ident) = unary.operand.as_ref() else {
                    return Err(CodegenError {
                        message: format!("operand of '{op}' has to be an identifier"),
                        position: Some(unary.position.clone()),
                    });
                };

                let location = self.lvalue(ident)?;
                let old = self.builder.build_load(&mut self.module, location.clone());
                let one = Value::const_i32(1);

                let new = match op {
                    UnaryOp::PreInc | UnaryOp::PostInc => {
                        self.builder
                            .build_binary(&mut self.module, BinOp::Add, old.clone(), one)
                    }
                    _ => self
                        .builder
                        .build_binary(&mut self.module, BinOp::Sub, old.clone(), one),
                };
                self.builder
                    .build_store(&mut self.module, new.clone(), location);

                // pre-forms yield the new value, post-forms the old one
                Ok(match op {
                    UnaryOp::PreInc | UnaryOp::PreDec => new,
                    _ => old,
                })
            }
        }
    }

    fn lower_call(&mut self, call: &Call<TypeInfo>) -> CResult<Value> {
        let Expression::Ident(ident) = call.callee.as_ref() else {
            return Err(CodegenError {
                message: "called value is not a function name".to_owned(),
                position: Some(call.position.clone()),
            });
        };

        let Some(&callee) = self.functions.lookup(&ident.value) else {
            return Err(CodegenError {
                message: format!("call to unknown function '{}'", ident.value),
                position: Some(call.position.clone()),
            });
        };

        let mut args = vec![];
        for arg in &call.args {
            args.push(self.lower_expression(arg)?);
        }

        Ok(self.builder.build_call(&mut self.module, callee, args))
    }
}
