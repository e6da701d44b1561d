//! Optimization passes over the IR.
//!
//! Two driver loops run per function, each iterated to a fixed point:
//! mem-to-register promotion with its two elimination passes, then constant
//! folding. Every sub-pass is followed by a verifier run; a verifier failure
//! is a compiler bug and aborts the compilation.
mod constant_folding;
mod mem2reg;

use crate::ir::{FuncId, InstKind, Module, VerifyError};

/// Run the whole pass suite over every function of the module.
pub fn optimize(module: &mut Module) -> Result<(), VerifyError> {
    mem2reg::run(module)?;
    constant_folding::run(module)?;
    Ok(())
}

/// Drop every value-producing instruction whose result has no uses. Stores,
/// calls and terminators always stay. One sweep; the fixed-point loops of
/// the drivers pick up instructions that became dead through this.
pub(crate) fn remove_dead_instructions(module: &mut Module, func: FuncId) -> bool {
    let function = module.function_mut(func);

    let mut dead = vec![];
    for (_, id) in function.live_insts() {
        let inst = function.inst(id);

        if inst.is_terminator() {
            continue;
        }
        if matches!(inst.kind, InstKind::Store { .. } | InstKind::Call { .. }) {
            continue;
        }

        if function.use_count(id) == 0 {
            dead.push(id);
        }
    }

    let changed = !dead.is_empty();
    for id in dead {
        function.erase_inst(id);
    }

    changed
}
