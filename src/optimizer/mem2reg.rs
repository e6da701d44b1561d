//! Promotion of stack slots to direct value references, with dead-store
//! elimination.
//!
//! No phi nodes are inserted: an alloca with a single store is promoted
//! through the dominator tree, an alloca whose loads and stores all sit in
//! one block is promoted by forwarding along the block, and everything else
//! is left alone.

use crate::ir::{
    verify_function, BlockId, DomTree, FuncId, InstId, InstKind, Module, Value, VerifyError,
};

use super::remove_dead_instructions;

/// Iterate promotion and the two elimination passes to a fixed point, per
/// function. A pass only runs when the ones before it did not change
/// anything this round.
pub(crate) fn run(module: &mut Module) -> Result<(), VerifyError> {
    for index in 0..module.functions.len() {
        let func = FuncId(index);
        if module.function(func).is_declaration() {
            continue;
        }

        loop {
            let mut changed = promote_allocas(module, func);
            verify_function(module, func)?;

            if !changed {
                changed = remove_dead_stores(module, func);
                verify_function(module, func)?;
            }
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

fn collect_allocas(module: &Module, func: FuncId) -> Vec<InstId> {
    let function = module.function(func);
    function
        .live_insts()
        .into_iter()
        .filter(|&(_, id)| matches!(function.inst(id).kind, InstKind::Alloca { .. }))
        .map(|(_, id)| id)
        .collect()
}

/// Loads and stores going through one alloca, in layout order.
fn slot_accesses(
    module: &Module,
    func: FuncId,
    alloca: InstId,
) -> (Vec<(BlockId, InstId)>, Vec<(BlockId, InstId, Value)>) {
    let function = module.function(func);
    let mut loads = vec![];
    let mut stores = vec![];

    for (block, id) in function.live_insts() {
        match &function.inst(id).kind {
            InstKind::Load { ptr } if *ptr == Value::Inst(alloca) => loads.push((block, id)),
            InstKind::Store { ptr, value } if *ptr == Value::Inst(alloca) => {
                stores.push((block, id, value.clone()))
            }
            _ => {}
        }
    }

    (loads, stores)
}

fn promote_allocas(module: &mut Module, func: FuncId) -> bool {
    let mut changed = false;

    let allocas = collect_allocas(module, func);
    // the passes only erase instructions, so the block graph and with it the
    // dominator tree stay valid throughout
    let dom = DomTree::compute(module.function(func));

    for alloca in allocas {
        let (loads, stores) = slot_accesses(module, func, alloca);

        if stores.is_empty() || loads.is_empty() {
            continue;
        }

        if let [(store_block, store, stored)] = &stores[..] {
            // one store: replace every load the store dominates with the
            // stored value; if that was every load, slot and store go too
            let mut load_before_store = false;

            for (load_block, load) in loads {
                let replace = if load_block == *store_block {
                    let function = module.function(func);
                    let store_position = function.position_in_block(load_block, *store);
                    let load_position = function.position_in_block(load_block, load);
                    matches!(
                        (store_position, load_position),
                        (Some(store), Some(load)) if store < load
                    )
                } else {
                    dom.dominates(*store_block, load_block)
                };

                if replace {
                    let function = module.function_mut(func);
                    function.replace_all_uses(load, stored);
                    function.erase_inst(load);
                    changed = true;
                } else {
                    load_before_store = true;
                }
            }

            if !load_before_store {
                let function = module.function_mut(func);
                function.erase_inst(*store);
                function.erase_inst(alloca);
                changed = true;
            }
            continue;
        }

        // several stores: only forward when every access sits in one block
        let anchor = stores[0].0;
        let same_block = stores.iter().all(|&(block, ..)| block == anchor)
            && loads.iter().all(|&(block, _)| block == anchor);
        if !same_block {
            continue;
        }

        // walk the block in order, tracking the latest stored value
        let order = module.function(func).block(anchor).insts.clone();
        let mut last_stored: Option<Value> = None;

        for id in order {
            let kind = module.function(func).inst(id).kind.clone();
            match kind {
                InstKind::Store { ptr, value } if ptr == Value::Inst(alloca) => {
                    last_stored = Some(value)
                }
                InstKind::Load { ptr } if ptr == Value::Inst(alloca) => {
                    if let Some(value) = &last_stored {
                        let function = module.function_mut(func);
                        function.replace_all_uses(id, value);
                        function.erase_inst(id);
                        changed = true;
                    }
                }
                _ => {}
            }
        }
    }

    changed
}

/// Erase the stores (and the slot) of every alloca that is never loaded.
fn remove_dead_stores(module: &mut Module, func: FuncId) -> bool {
    let mut changed = false;

    for alloca in collect_allocas(module, func) {
        let (loads, stores) = slot_accesses(module, func, alloca);
        if !loads.is_empty() {
            continue;
        }

        let function = module.function_mut(func);
        for (_, store, _) in &stores {
            function.erase_inst(*store);
            changed = true;
        }
        function.erase_inst(alloca);
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Builder, Function, IrType, Module, Value};

    fn function_with_entry(module: &mut Module) -> (FuncId, BlockId, Builder) {
        let func = module.add_function(Function::new("f", vec![], IrType::I32, false));
        let entry = module.function_mut(func).add_block("entry");
        let mut builder = Builder::new();
        builder.position_at_end(func, entry);
        (func, entry, builder)
    }

    fn count_allocas(module: &Module, func: FuncId) -> usize {
        collect_allocas(module, func).len()
    }

    #[test]
    fn test_single_store_promotion_across_blocks() {
        let mut module = Module::new();
        let (func, _, mut builder) = function_with_entry(&mut module);

        let slot = builder.build_alloca(&mut module, IrType::I32, "x");
        builder.build_store(&mut module, Value::const_i32(7), slot.clone());

        let next = module.function_mut(func).add_block("next");
        builder.build_br(&mut module, next);
        builder.position_at_end(func, next);
        let value = builder.build_load(&mut module, slot);
        builder.build_ret(&mut module, Some(value));

        run(&mut module).unwrap();

        assert_eq!(count_allocas(&module, func), 0);
        let printed = module.to_string();
        assert!(printed.contains("ret i32 7"), "{printed}");
        assert!(!printed.contains("load"), "{printed}");
    }

    #[test]
    fn test_load_before_single_store_keeps_the_slot() {
        let mut module = Module::new();
        let (func, _, builder) = function_with_entry(&mut module);

        // int x; y = x; x = 5; — the load observes the unstored slot
        let slot = builder.build_alloca(&mut module, IrType::I32, "x");
        let early = builder.build_load(&mut module, slot.clone());
        builder.build_store(&mut module, Value::const_i32(5), slot.clone());
        builder.build_ret(&mut module, Some(early));

        run(&mut module).unwrap();

        assert_eq!(count_allocas(&module, func), 1);
        let printed = module.to_string();
        assert!(printed.contains("load"), "{printed}");
    }

    #[test]
    fn test_same_block_forwarding_with_two_stores() {
        let mut module = Module::new();
        let (func, _, builder) = function_with_entry(&mut module);

        let slot = builder.build_alloca(&mut module, IrType::I32, "a");
        builder.build_store(&mut module, Value::const_i32(2), slot.clone());
        let first = builder.build_load(&mut module, slot.clone());
        builder.build_store(&mut module, first, slot.clone());
        let second = builder.build_load(&mut module, slot);
        builder.build_ret(&mut module, Some(second));

        run(&mut module).unwrap();

        assert_eq!(count_allocas(&module, func), 0);
        let printed = module.to_string();
        assert!(printed.contains("ret i32 2"), "{printed}");
    }

    #[test]
    fn test_dead_stores_and_slots_are_removed() {
        let mut module = Module::new();
        let (func, _, builder) = function_with_entry(&mut module);

        let slot = builder.build_alloca(&mut module, IrType::I32, "unused");
        builder.build_store(&mut module, Value::const_i32(1), slot.clone());
        builder.build_store(&mut module, Value::const_i32(2), slot);
        builder.build_ret(&mut module, Some(Value::const_i32(0)));

        run(&mut module).unwrap();

        assert_eq!(count_allocas(&module, func), 0);
        let printed = module.to_string();
        assert!(!printed.contains("store"), "{printed}");
    }

    #[test]
    fn test_multi_block_multi_store_is_left_alone() {
        let mut module = Module::new();
        let (func, _, mut builder) = function_with_entry(&mut module);

        let slot = builder.build_alloca(&mut module, IrType::I32, "x");
        builder.build_store(&mut module, Value::const_i32(1), slot.clone());

        let next = module.function_mut(func).add_block("next");
        builder.build_br(&mut module, next);
        builder.position_at_end(func, next);
        builder.build_store(&mut module, Value::const_i32(2), slot.clone());
        let value = builder.build_load(&mut module, slot);
        builder.build_ret(&mut module, Some(value));

        run(&mut module).unwrap();

        // no phi insertion: the slot survives
        assert_eq!(count_allocas(&module, func), 1);
    }
}
