use super::{BinOp, BlockId, FuncId, IcmpPred, Inst, InstKind, IrType, Module, UnOp, Value};

/// Appends instructions at a current insertion point. The builder only holds
/// positions; the module owns everything it builds.
#[derive(Debug, Default)]
pub struct Builder {
    func: Option<FuncId>,
    block: Option<BlockId>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Point the builder at the end of `block` within `func`.
    pub fn position_at_end(&mut self, func: FuncId, block: BlockId) {
        self.func = Some(func);
        self.block = Some(block);
    }

    pub fn function(&self) -> Option<FuncId> {
        self.func
    }

    fn spot(&self) -> (FuncId, BlockId) {
        let (Some(func), Some(block)) = (self.func, self.block) else {
            panic!("builder used without an insertion point")
        };
        (func, block)
    }

    fn push(&self, module: &mut Module, inst: Inst) -> Value {
        let (func, block) = self.spot();
        Value::Inst(module.function_mut(func).push_inst(block, inst))
    }

    /// Reserve a stack slot. Allocas always go into the entry block, in
    /// front of its terminator if it already has one.
    pub fn build_alloca(&self, module: &mut Module, allocated: IrType, name: &str) -> Value {
        let (func, _) = self.spot();
        let function = module.function_mut(func);

        let Some(entry) = function.entry() else {
            panic!("alloca outside a function body")
        };

        let insts = &function.block(entry).insts;
        let index = match insts.last() {
            Some(&last) if function.inst(last).is_terminator() => insts.len() - 1,
            _ => insts.len(),
        };

        let inst = Inst {
            ty: allocated.clone().ptr_to(),
            kind: InstKind::Alloca { allocated },
            name: Some(name.to_owned()),
        };

        Value::Inst(function.insert_inst(entry, index, inst))
    }

    pub fn build_load(&self, module: &mut Module, ptr: Value) -> Value {
        let (func, _) = self.spot();

        let Some(ty) = module.value_type(func, &ptr).pointee().cloned() else {
            panic!("load from a non-pointer value")
        };

        self.push(
            module,
            Inst {
                kind: InstKind::Load { ptr },
                ty,
                name: None,
            },
        )
    }

    pub fn build_store(&self, module: &mut Module, value: Value, ptr: Value) {
        self.push(
            module,
            Inst {
                kind: InstKind::Store { value, ptr },
                ty: IrType::Void,
                name: None,
            },
        );
    }

    pub fn build_binary(&self, module: &mut Module, op: BinOp, lhs: Value, rhs: Value) -> Value {
        let (func, _) = self.spot();
        let ty = module.value_type(func, &lhs);

        self.push(
            module,
            Inst {
                kind: InstKind::Binary { op, lhs, rhs },
                ty,
                name: None,
            },
        )
    }

    pub fn build_icmp(&self, module: &mut Module, pred: IcmpPred, lhs: Value, rhs: Value) -> Value {
        self.push(
            module,
            Inst {
                kind: InstKind::Icmp { pred, lhs, rhs },
                ty: IrType::I1,
                name: None,
            },
        )
    }

    pub fn build_unary(&self, module: &mut Module, op: UnOp, operand: Value) -> Value {
        let (func, _) = self.spot();
        let ty = module.value_type(func, &operand);

        self.push(
            module,
            Inst {
                kind: InstKind::Unary { op, operand },
                ty,
                name: None,
            },
        )
    }

    pub fn build_call(&self, module: &mut Module, callee: FuncId, args: Vec<Value>) -> Value {
        let ty = module.function(callee).ret.clone();

        self.push(
            module,
            Inst {
                kind: InstKind::Call { callee, args },
                ty,
                name: None,
            },
        )
    }

    pub fn build_ret(&self, module: &mut Module, value: Option<Value>) {
        self.push(
            module,
            Inst {
                kind: InstKind::Ret { value },
                ty: IrType::Void,
                name: None,
            },
        );
    }

    pub fn build_br(&self, module: &mut Module, target: BlockId) {
        self.push(
            module,
            Inst {
                kind: InstKind::Br { target },
                ty: IrType::Void,
                name: None,
            },
        );
    }

    pub fn build_cond_br(
        &self,
        module: &mut Module,
        cond: Value,
        then_target: BlockId,
        else_target: BlockId,
    ) {
        self.push(
            module,
            Inst {
                kind: InstKind::CondBr {
                    cond,
                    then_target,
                    else_target,
                },
                ty: IrType::Void,
                name: None,
            },
        );
    }
}
