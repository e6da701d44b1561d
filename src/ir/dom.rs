//! Dominator analysis over the control flow graph of a function.

use std::collections::{HashMap, HashSet};

use super::{BlockId, Function, InstKind};

/// Branch targets of a block, in instruction order.
pub fn successors(function: &Function, block: BlockId) -> Vec<BlockId> {
    let Some(&last) = function.block(block).insts.last() else {
        return vec![];
    };

    match &function.inst(last).kind {
        InstKind::Br { target } => vec![*target],
        InstKind::CondBr {
            then_target,
            else_target,
            ..
        } => vec![*then_target, *else_target],
        _ => vec![],
    }
}

/// Block-level dominator sets, computed with the classic iterative data
/// flow. Blocks unreachable from the entry keep the full set, i.e. they are
/// treated as dominated by everything.
#[derive(Debug)]
pub struct DomTree {
    doms: HashMap<BlockId, HashSet<BlockId>>,
}

impl DomTree {
    pub fn compute(function: &Function) -> DomTree {
        let Some(entry) = function.entry() else {
            return DomTree {
                doms: HashMap::new(),
            };
        };

        let all: HashSet<BlockId> = function.layout().iter().copied().collect();

        let mut predecessors: HashMap<BlockId, Vec<BlockId>> = HashMap::new();
        for &block in function.layout() {
            for successor in successors(function, block) {
                predecessors.entry(successor).or_default().push(block);
            }
        }

        let mut doms: HashMap<BlockId, HashSet<BlockId>> = function
            .layout()
            .iter()
            .map(|&block| (block, all.clone()))
            .collect();
        doms.insert(entry, HashSet::from([entry]));

        loop {
            let mut changed = false;

            for &block in function.layout() {
                if block == entry {
                    continue;
                }

                let Some(preds) = predecessors.get(&block) else {
                    continue;
                };

                let mut new: Option<HashSet<BlockId>> = None;
                for pred in preds {
                    let pred_doms = &doms[pred];
                    new = Some(match new {
                        None => pred_doms.clone(),
                        Some(set) => set.intersection(pred_doms).copied().collect(),
                    });
                }

                let Some(mut new) = new else {
                    continue;
                };
                new.insert(block);

                if new != doms[&block] {
                    doms.insert(block, new);
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }

        DomTree { doms }
    }

    /// Does `a` dominate `b`?
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        self.doms
            .get(&b)
            .map(|doms| doms.contains(&a))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Builder, FuncId, Function, IrType, Module, Value};

    fn diamond() -> (Module, FuncId) {
        let mut module = Module::new();
        let func = module.add_function(Function::new("f", vec![], IrType::I32, false));

        let function = module.function_mut(func);
        let entry = function.add_block("entry");
        let then_block = function.add_block("then");
        let else_block = function.add_block("else");
        let merge = function.add_block("merge");

        let mut builder = Builder::new();
        builder.position_at_end(func, entry);
        builder.build_cond_br(
            &mut module,
            Value::ConstInt { bits: 1, value: 1 },
            then_block,
            else_block,
        );

        builder.position_at_end(func, then_block);
        builder.build_br(&mut module, merge);
        builder.position_at_end(func, else_block);
        builder.build_br(&mut module, merge);
        builder.position_at_end(func, merge);
        builder.build_ret(&mut module, Some(Value::const_i32(0)));

        (module, func)
    }

    #[test]
    fn test_entry_dominates_everything() {
        let (module, func) = diamond();
        let function = module.function(func);
        let dom = DomTree::compute(function);

        let entry = function.layout()[0];
        for &block in function.layout() {
            assert!(dom.dominates(entry, block));
        }
    }

    #[test]
    fn test_branch_arms_do_not_dominate_the_join() {
        let (module, func) = diamond();
        let function = module.function(func);
        let dom = DomTree::compute(function);

        let then_block = function.layout()[1];
        let else_block = function.layout()[2];
        let merge = function.layout()[3];

        assert!(!dom.dominates(then_block, merge));
        assert!(!dom.dominates(else_block, merge));
        assert!(dom.dominates(merge, merge));
    }
}
