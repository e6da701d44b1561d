//! Structural checks over lowered functions. A failure here is a compiler
//! bug, never a user error; the driver aborts on it.

use std::collections::{HashMap, HashSet};
use std::{error::Error, fmt::Display};

use super::{successors, BlockId, DomTree, FuncId, InstId, InstKind, Module, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct VerifyError {
    pub function: String,
    pub message: String,
}

impl Display for VerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "IR verification failed in '{}': {}",
            self.function, self.message
        )
    }
}

impl Error for VerifyError {}

/// Verify every function of the module.
pub fn verify_module(module: &Module) -> Result<(), VerifyError> {
    for index in 0..module.functions.len() {
        verify_function(module, FuncId(index))?;
    }
    Ok(())
}

/// Verify one function: every scheduled block ends with exactly one
/// terminator, branch targets are scheduled, operands refer to scheduled
/// instructions, and on reachable blocks every use is dominated by its
/// definition.
pub fn verify_function(module: &Module, func: FuncId) -> Result<(), VerifyError> {
    let function = module.function(func);

    if function.is_declaration() {
        return Ok(());
    }

    let fail = |message: String| {
        Err(VerifyError {
            function: function.name.clone(),
            message,
        })
    };

    let scheduled_blocks: HashSet<BlockId> = function.layout().iter().copied().collect();
    let scheduled_insts: HashSet<InstId> =
        function.live_insts().iter().map(|&(_, id)| id).collect();

    for &block in function.layout() {
        let label = &function.block(block).label;
        let insts = &function.block(block).insts;

        let Some((&last, body)) = insts.split_last() else {
            return fail(format!("block '{label}' is empty"));
        };

        if !function.inst(last).is_terminator() {
            return fail(format!("block '{label}' does not end with a terminator"));
        }

        if body.iter().any(|&id| function.inst(id).is_terminator()) {
            return fail(format!(
                "block '{label}' has an instruction after its terminator"
            ));
        }

        for &id in insts {
            match &function.inst(id).kind {
                InstKind::Br { target } => {
                    if !scheduled_blocks.contains(target) {
                        return fail(format!("block '{label}' branches to an unscheduled block"));
                    }
                }
                InstKind::CondBr {
                    then_target,
                    else_target,
                    ..
                } => {
                    if !scheduled_blocks.contains(then_target)
                        || !scheduled_blocks.contains(else_target)
                    {
                        return fail(format!("block '{label}' branches to an unscheduled block"));
                    }
                }
                InstKind::Call { callee, .. } => {
                    if callee.0 >= module.functions.len() {
                        return fail(format!("block '{label}' calls an unknown function"));
                    }
                }
                _ => {}
            }

            for operand in function.inst(id).operands() {
                match operand {
                    Value::Inst(op) => {
                        if !scheduled_insts.contains(op) {
                            return fail(format!(
                                "block '{label}' uses an erased instruction"
                            ));
                        }
                    }
                    Value::Param(index) => {
                        if *index >= function.params.len() {
                            return fail(format!(
                                "block '{label}' uses a parameter out of range"
                            ));
                        }
                    }
                    Value::Global(id) => {
                        if id.0 >= module.globals.len() {
                            return fail(format!("block '{label}' uses an unknown global"));
                        }
                    }
                    Value::Str(id) => {
                        if id.0 >= module.strings.len() {
                            return fail(format!(
                                "block '{label}' uses an unknown string literal"
                            ));
                        }
                    }
                    Value::ConstInt { .. } | Value::ConstFloat(_) => {}
                }
            }
        }
    }

    // definitions must dominate their uses, checked on reachable blocks only
    let dom = DomTree::compute(function);

    let mut reachable = HashSet::new();
    if let Some(entry) = function.entry() {
        let mut worklist = vec![entry];
        while let Some(block) = worklist.pop() {
            if !reachable.insert(block) {
                continue;
            }
            worklist.extend(successors(function, block));
        }
    }

    let mut positions: HashMap<InstId, (BlockId, usize)> = HashMap::new();
    for &block in function.layout() {
        for (index, &id) in function.block(block).insts.iter().enumerate() {
            positions.insert(id, (block, index));
        }
    }

    for &block in function.layout() {
        if !reachable.contains(&block) {
            continue;
        }
        let label = &function.block(block).label;

        for (use_index, &id) in function.block(block).insts.iter().enumerate() {
            for operand in function.inst(id).operands() {
                let Value::Inst(def) = operand else {
                    continue;
                };
                let Some(&(def_block, def_index)) = positions.get(def) else {
                    continue;
                };

                let dominated = if def_block == block {
                    def_index < use_index
                } else {
                    dom.dominates(def_block, block)
                };

                if !dominated {
                    return fail(format!(
                        "a use in block '{label}' is not dominated by its definition"
                    ));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Builder, Function, Inst, InstKind, IrType, Module, Value};

    fn single_block_function(module: &mut Module) -> (FuncId, crate::ir::BlockId) {
        let func = module.add_function(Function::new("f", vec![], IrType::I32, false));
        let entry = module.function_mut(func).add_block("entry");
        (func, entry)
    }

    #[test]
    fn test_accepts_a_minimal_function() {
        let mut module = Module::new();
        let (func, entry) = single_block_function(&mut module);

        let mut builder = Builder::new();
        builder.position_at_end(func, entry);
        builder.build_ret(&mut module, Some(Value::const_i32(0)));

        assert!(verify_function(&module, func).is_ok());
    }

    #[test]
    fn test_rejects_a_block_without_terminator() {
        let mut module = Module::new();
        let (func, entry) = single_block_function(&mut module);

        let mut builder = Builder::new();
        builder.position_at_end(func, entry);
        builder.build_alloca(&mut module, IrType::I32, "x");

        let error = verify_function(&module, func);
        assert!(error.is_err());
    }

    #[test]
    fn test_rejects_instructions_after_the_terminator() {
        let mut module = Module::new();
        let (func, entry) = single_block_function(&mut module);

        let mut builder = Builder::new();
        builder.position_at_end(func, entry);
        builder.build_ret(&mut module, Some(Value::const_i32(0)));
        module.function_mut(func).push_inst(
            entry,
            Inst {
                kind: InstKind::Ret {
                    value: Some(Value::const_i32(1)),
                },
                ty: IrType::Void,
                name: None,
            },
        );

        assert!(verify_function(&module, func).is_err());
    }

    #[test]
    fn test_rejects_uses_of_erased_instructions() {
        let mut module = Module::new();
        let (func, entry) = single_block_function(&mut module);

        let mut builder = Builder::new();
        builder.position_at_end(func, entry);
        let slot = builder.build_alloca(&mut module, IrType::I32, "x");
        let value = builder.build_load(&mut module, slot.clone());
        builder.build_ret(&mut module, Some(value.clone()));

        let Value::Inst(load) = value else {
            unreachable!()
        };
        module.function_mut(func).erase_inst(load);

        assert!(verify_function(&module, func).is_err());
    }

    #[test]
    fn test_canonicalize_truncates_after_terminator() {
        let mut module = Module::new();
        let (func, entry) = single_block_function(&mut module);

        let mut builder = Builder::new();
        builder.position_at_end(func, entry);
        builder.build_ret(&mut module, Some(Value::const_i32(0)));
        builder.build_ret(&mut module, Some(Value::const_i32(1)));

        assert!(verify_function(&module, func).is_err());

        module.function_mut(func).canonicalize();
        assert!(verify_function(&module, func).is_ok());
        assert_eq!(module.function(func).block(entry).insts.len(), 1);
    }

    #[test]
    fn test_canonicalize_drops_unreferenced_empty_blocks() {
        let mut module = Module::new();
        let (func, entry) = single_block_function(&mut module);
        let dangling = module.function_mut(func).add_block("merge");

        let mut builder = Builder::new();
        builder.position_at_end(func, entry);
        builder.build_ret(&mut module, Some(Value::const_i32(0)));

        module.function_mut(func).canonicalize();

        assert!(!module.function(func).layout().contains(&dangling));
        assert!(verify_function(&module, func).is_ok());
    }
}
