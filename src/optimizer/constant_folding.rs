//! Folding of integer arithmetic over constant operands.

use crate::ir::{verify_function, BinOp, FuncId, InstId, InstKind, Module, Value, VerifyError};

use super::remove_dead_instructions;

/// Iterate folding and dead-instruction elimination to a fixed point, per
/// function.
pub(crate) fn run(module: &mut Module) -> Result<(), VerifyError> {
    for index in 0..module.functions.len() {
        let func = FuncId(index);
        if module.function(func).is_declaration() {
            continue;
        }

        loop {
            let mut changed = propagate_constants(module, func);
            verify_function(module, func)?;

            if !changed {
                changed = remove_dead_instructions(module, func);
                verify_function(module, func)?;
            }

            if !changed {
                break;
            }
        }
    }

    Ok(())
}

/// Compute one operation over the sign-extended 64-bit operand values.
/// Division and remainder by a zero constant are left unfolded, as is
/// `ashr`.
fn fold(op: BinOp, lhs: i64, rhs: i64) -> Option<i64> {
    let value = match op {
        BinOp::Add => lhs.wrapping_add(rhs),
        BinOp::Sub => lhs.wrapping_sub(rhs),
        BinOp::Mul => lhs.wrapping_mul(rhs),
        BinOp::SDiv => {
            if rhs == 0 {
                return None;
            }
            lhs.wrapping_div(rhs)
        }
        BinOp::SRem => {
            if rhs == 0 {
                return None;
            }
            lhs.wrapping_rem(rhs)
        }
        BinOp::And => lhs & rhs,
        BinOp::Or => lhs | rhs,
        BinOp::Xor => lhs ^ rhs,
        BinOp::Shl => lhs.wrapping_shl(rhs as u32),
        BinOp::AShr => return None,
    };
    Some(value)
}

/// Truncate a folded value to the bit width of the operands, keeping it sign
/// extended.
fn truncate(bits: u32, value: i64) -> i64 {
    match bits {
        1 => value & 1,
        8 => value as i8 as i64,
        _ => value as i32 as i64,
    }
}

fn propagate_constants(module: &mut Module, func: FuncId) -> bool {
    let candidates: Vec<(InstId, u32, i64)> = {
        let function = module.function(func);
        function
            .live_insts()
            .into_iter()
            .filter_map(|(_, id)| {
                let InstKind::Binary { op, lhs, rhs } = &function.inst(id).kind else {
                    return None;
                };
                let (
                    Value::ConstInt { bits, value: lhs },
                    Value::ConstInt { value: rhs, .. },
                ) = (lhs, rhs)
                else {
                    return None;
                };

                fold(*op, *lhs, *rhs).map(|value| (id, *bits, value))
            })
            .collect()
    };

    let changed = !candidates.is_empty();

    for (id, bits, value) in candidates {
        let constant = Value::ConstInt {
            bits,
            value: truncate(bits, value),
        };
        let function = module.function_mut(func);
        function.replace_all_uses(id, &constant);
        function.erase_inst(id);
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Builder, Function, IrType};

    fn fold_function(build: impl FnOnce(&Builder, &mut Module)) -> Module {
        let mut module = Module::new();
        let func = module.add_function(Function::new("f", vec![], IrType::I32, false));
        let entry = module.function_mut(func).add_block("entry");
        let mut builder = Builder::new();
        builder.position_at_end(func, entry);
        build(&builder, &mut module);
        run(&mut module).unwrap();
        module
    }

    #[test]
    fn test_folds_a_chain_of_constants() {
        // (2 + 3) * 4
        let module = fold_function(|builder, module| {
            let sum = builder.build_binary(module, BinOp::Add, Value::const_i32(2), Value::const_i32(3));
            let product = builder.build_binary(module, BinOp::Mul, sum, Value::const_i32(4));
            builder.build_ret(module, Some(product));
        });

        let printed = module.to_string();
        assert!(printed.contains("ret i32 20"), "{printed}");
        assert!(!printed.contains("add"), "{printed}");
        assert!(!printed.contains("mul"), "{printed}");
    }

    #[test]
    fn test_division_by_zero_constant_is_left_alone() {
        let module = fold_function(|builder, module| {
            let quotient = builder.build_binary(
                module,
                BinOp::SDiv,
                Value::const_i32(1),
                Value::const_i32(0),
            );
            builder.build_ret(module, Some(quotient));
        });

        let printed = module.to_string();
        assert!(printed.contains("sdiv"), "{printed}");
    }

    #[test]
    fn test_result_is_truncated_to_the_operand_width() {
        // shifting 1 across the i32 sign bit wraps to a negative value
        let module = fold_function(|builder, module| {
            let shifted = builder.build_binary(
                module,
                BinOp::Shl,
                Value::const_i32(1),
                Value::const_i32(31),
            );
            builder.build_ret(module, Some(shifted));
        });

        let printed = module.to_string();
        assert!(printed.contains("ret i32 -2147483648"), "{printed}");
    }

    #[test]
    fn test_operands_behind_parameters_are_not_folded() {
        let mut module = Module::new();
        let func = module.add_function(Function::new(
            "f",
            vec![crate::ir::FuncParam {
                name: "x".to_owned(),
                ty: IrType::I32,
            }],
            IrType::I32,
            false,
        ));
        let entry = module.function_mut(func).add_block("entry");
        let mut builder = Builder::new();
        builder.position_at_end(func, entry);

        let sum = builder.build_binary(
            &mut module,
            BinOp::Add,
            Value::Param(0),
            Value::const_i32(1),
        );
        builder.build_ret(&mut module, Some(sum));

        run(&mut module).unwrap();

        let printed = module.to_string();
        assert!(printed.contains("add i32 %x, 1"), "{printed}");
    }
}
