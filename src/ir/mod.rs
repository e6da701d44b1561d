//! The intermediate representation: a module of functions, functions of
//! basic blocks, blocks of instructions.
//!
//! Instructions live in a per-function arena and reference each other
//! through [`InstId`] indices; a [`Value`] is either such an index, a
//! constant, a formal parameter, or the address of a global. Erasing an
//! instruction unlinks it from its block; the arena slot stays behind and is
//! never visited again.
mod builder;
mod dom;
mod printer;
mod verify;

pub use self::builder::*;
pub use self::dom::*;
pub use self::verify::*;

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FuncId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlobalId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrId(pub usize);

/// Types of IR values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrType {
    I1,
    I8,
    I32,
    F32,
    Void,
    Ptr(Box<IrType>),
}

impl IrType {
    pub fn ptr_to(self) -> IrType {
        IrType::Ptr(Box::new(self))
    }

    /// Element type of a pointer.
    pub fn pointee(&self) -> Option<&IrType> {
        match self {
            IrType::Ptr(element) => Some(element),
            _ => None,
        }
    }
}

impl Display for IrType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IrType::I1 => f.write_str("i1"),
            IrType::I8 => f.write_str("i8"),
            IrType::I32 => f.write_str("i32"),
            IrType::F32 => f.write_str("float"),
            IrType::Void => f.write_str("void"),
            IrType::Ptr(element) => write!(f, "{element}*"),
        }
    }
}

/// An operand (or result reference) of an instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer constant of the given bit width, kept sign extended.
    ConstInt { bits: u32, value: i64 },
    ConstFloat(f32),
    /// The n-th formal parameter of the containing function.
    Param(usize),
    /// Pointer to an interned string literal.
    Str(StrId),
    /// Address of a global variable.
    Global(GlobalId),
    /// Result of an instruction of the containing function.
    Inst(InstId),
}

impl Value {
    pub fn const_i32(value: i32) -> Value {
        Value::ConstInt {
            bits: 32,
            value: value as i64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    SDiv,
    SRem,
    And,
    Or,
    Xor,
    Shl,
    AShr,
}

impl Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BinOp::Add => "add",
            BinOp::Sub => "sub",
            BinOp::Mul => "mul",
            BinOp::SDiv => "sdiv",
            BinOp::SRem => "srem",
            BinOp::And => "and",
            BinOp::Or => "or",
            BinOp::Xor => "xor",
            BinOp::Shl => "shl",
            BinOp::AShr => "ashr",
        })
    }
}

/// Predicates of the signed integer comparison instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcmpPred {
    Eq,
    Ne,
    Sgt,
    Sge,
    Slt,
    Sle,
}

impl Display for IcmpPred {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            IcmpPred::Eq => "eq",
            IcmpPred::Ne => "ne",
            IcmpPred::Sgt => "sgt",
            IcmpPred::Sge => "sge",
            IcmpPred::Slt => "slt",
            IcmpPred::Sle => "sle",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

impl Display for UnOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            UnOp::Neg => "neg",
            UnOp::Not => "not",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstKind {
    /// A stack slot in the entry block.
    Alloca { allocated: IrType },
    Load {
        ptr: Value,
    },
    Store {
        value: Value,
        ptr: Value,
    },
    Binary {
        op: BinOp,
        lhs: Value,
        rhs: Value,
    },
    Icmp {
        pred: IcmpPred,
        lhs: Value,
        rhs: Value,
    },
    Unary {
        op: UnOp,
        operand: Value,
    },
    Call {
        callee: FuncId,
        args: Vec<Value>,
    },
    Ret {
        value: Option<Value>,
    },
    Br {
        target: BlockId,
    },
    CondBr {
        cond: Value,
        then_target: BlockId,
        else_target: BlockId,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Inst {
    pub kind: InstKind,
    /// Result type; `Void` for instructions without a result.
    pub ty: IrType,
    /// Printing hint taken from the source name, if any.
    pub name: Option<String>,
}

impl Inst {
    pub fn is_terminator(&self) -> bool {
        matches!(
            self.kind,
            InstKind::Ret { .. } | InstKind::Br { .. } | InstKind::CondBr { .. }
        )
    }

    /// Whether the instruction produces a value other instructions can use.
    pub fn has_result(&self) -> bool {
        !self.is_terminator() && !matches!(self.kind, InstKind::Store { .. }) && self.ty != IrType::Void
    }

    pub fn operands(&self) -> Vec<&Value> {
        match &self.kind {
            InstKind::Alloca { .. } | InstKind::Br { .. } => vec![],
            InstKind::Load { ptr } => vec![ptr],
            InstKind::Store { value, ptr } => vec![value, ptr],
            InstKind::Binary { lhs, rhs, .. } | InstKind::Icmp { lhs, rhs, .. } => vec![lhs, rhs],
            InstKind::Unary { operand, .. } => vec![operand],
            InstKind::Call { args, .. } => args.iter().collect(),
            InstKind::Ret { value } => value.iter().collect(),
            InstKind::CondBr { cond, .. } => vec![cond],
        }
    }

    pub fn operands_mut(&mut self) -> Vec<&mut Value> {
        match &mut self.kind {
            InstKind::Alloca { .. } | InstKind::Br { .. } => vec![],
            InstKind::Load { ptr } => vec![ptr],
            InstKind::Store { value, ptr } => vec![value, ptr],
            InstKind::Binary { lhs, rhs, .. } | InstKind::Icmp { lhs, rhs, .. } => vec![lhs, rhs],
            InstKind::Unary { operand, .. } => vec![operand],
            InstKind::Call { args, .. } => args.iter_mut().collect(),
            InstKind::Ret { value } => value.iter_mut().collect(),
            InstKind::CondBr { cond, .. } => vec![cond],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub label: String,
    pub insts: Vec<InstId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncParam {
    pub name: String,
    pub ty: IrType,
}

/// A function: a declaration (no blocks) or a definition whose first block
/// in the layout is the entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<FuncParam>,
    pub ret: IrType,
    pub variadic: bool,
    blocks: Vec<Block>,
    layout: Vec<BlockId>,
    insts: Vec<Inst>,
}

impl Function {
    pub fn new(name: &str, params: Vec<FuncParam>, ret: IrType, variadic: bool) -> Function {
        Function {
            name: name.to_owned(),
            params,
            ret,
            variadic,
            blocks: vec![],
            layout: vec![],
            insts: vec![],
        }
    }

    pub fn is_declaration(&self) -> bool {
        self.layout.is_empty()
    }

    pub fn entry(&self) -> Option<BlockId> {
        self.layout.first().copied()
    }

    pub fn layout(&self) -> &[BlockId] {
        &self.layout
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    pub fn inst(&self, id: InstId) -> &Inst {
        &self.insts[id.0]
    }

    /// Create a block without scheduling it; it only becomes part of the
    /// function once [`Function::append_block`] is called.
    pub fn create_block(&mut self, label: &str) -> BlockId {
        let label = self.unique_label(label);
        let id = BlockId(self.blocks.len());
        self.blocks.push(Block {
            label,
            insts: vec![],
        });
        id
    }

    pub fn append_block(&mut self, block: BlockId) {
        self.layout.push(block);
    }

    /// Create a block and schedule it at the end of the layout.
    pub fn add_block(&mut self, label: &str) -> BlockId {
        let block = self.create_block(label);
        self.append_block(block);
        block
    }

    fn unique_label(&self, hint: &str) -> String {
        if !self.blocks.iter().any(|block| block.label == hint) {
            return hint.to_owned();
        }

        let mut counter = 1;
        loop {
            let label = format!("{hint}{counter}");
            if !self.blocks.iter().any(|block| block.label == label) {
                return label;
            }
            counter += 1;
        }
    }

    /// Append an instruction to a block.
    pub fn push_inst(&mut self, block: BlockId, inst: Inst) -> InstId {
        let id = InstId(self.insts.len());
        self.insts.push(inst);
        self.blocks[block.0].insts.push(id);
        id
    }

    /// Insert an instruction at a fixed position within a block.
    pub fn insert_inst(&mut self, block: BlockId, index: usize, inst: Inst) -> InstId {
        let id = InstId(self.insts.len());
        self.insts.push(inst);
        self.blocks[block.0].insts.insert(index, id);
        id
    }

    /// Unlink an instruction from whichever block holds it.
    pub fn erase_inst(&mut self, id: InstId) {
        for block in &mut self.blocks {
            block.insts.retain(|&inst| inst != id);
        }
    }

    /// Position of an instruction within a block.
    pub fn position_in_block(&self, block: BlockId, id: InstId) -> Option<usize> {
        self.blocks[block.0].insts.iter().position(|&inst| inst == id)
    }

    /// All scheduled instructions in layout order.
    pub fn live_insts(&self) -> Vec<(BlockId, InstId)> {
        self.layout
            .iter()
            .flat_map(|&block| {
                self.blocks[block.0]
                    .insts
                    .iter()
                    .map(move |&inst| (block, inst))
            })
            .collect()
    }

    /// Replace every use of `from`'s result with `to`.
    pub fn replace_all_uses(&mut self, from: InstId, to: &Value) {
        let ids: Vec<InstId> = self.live_insts().iter().map(|&(_, id)| id).collect();

        for id in ids {
            for operand in self.insts[id.0].operands_mut() {
                if *operand == Value::Inst(from) {
                    *operand = to.clone();
                }
            }
        }
    }

    /// Number of uses of an instruction's result among scheduled
    /// instructions.
    pub fn use_count(&self, id: InstId) -> usize {
        self.live_insts()
            .iter()
            .flat_map(|&(_, user)| self.inst(user).operands())
            .filter(|&operand| *operand == Value::Inst(id))
            .count()
    }

    /// Make the function well-formed after lowering: within every block,
    /// drop everything after the first terminator, then drop empty blocks
    /// nothing branches to. The entry stays even when empty.
    pub fn canonicalize(&mut self) {
        for index in 0..self.layout.len() {
            let block = self.layout[index];
            let first_terminator = self.blocks[block.0]
                .insts
                .iter()
                .position(|&inst| self.insts[inst.0].is_terminator());

            if let Some(position) = first_terminator {
                self.blocks[block.0].insts.truncate(position + 1);
            }
        }

        let mut referenced = vec![];
        for (_, id) in self.live_insts() {
            match &self.insts[id.0].kind {
                InstKind::Br { target } => referenced.push(*target),
                InstKind::CondBr {
                    then_target,
                    else_target,
                    ..
                } => {
                    referenced.push(*then_target);
                    referenced.push(*else_target);
                }
                _ => {}
            }
        }

        let entry = self.entry();
        let blocks = &self.blocks;
        self.layout.retain(|&block| {
            Some(block) == entry
                || !blocks[block.0].insts.is_empty()
                || referenced.contains(&block)
        });
    }
}

/// A zero-initialised global variable.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalVar {
    pub name: String,
    pub ty: IrType,
}

/// An interned string literal.
#[derive(Debug, Clone, PartialEq)]
pub struct StrLit {
    pub name: String,
    pub value: String,
}

/// A module owns its functions, global variables and interned string
/// literals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    pub functions: Vec<Function>,
    pub globals: Vec<GlobalVar>,
    pub strings: Vec<StrLit>,
}

impl Module {
    pub fn new() -> Module {
        Module::default()
    }

    pub fn add_function(&mut self, function: Function) -> FuncId {
        self.functions.push(function);
        FuncId(self.functions.len() - 1)
    }

    pub fn function(&self, id: FuncId) -> &Function {
        &self.functions[id.0]
    }

    pub fn function_mut(&mut self, id: FuncId) -> &mut Function {
        &mut self.functions[id.0]
    }

    pub fn add_global(&mut self, name: &str, ty: IrType) -> GlobalId {
        self.globals.push(GlobalVar {
            name: name.to_owned(),
            ty,
        });
        GlobalId(self.globals.len() - 1)
    }

    /// Intern a string literal; identical literals share one global.
    pub fn intern_string(&mut self, value: &str) -> StrId {
        if let Some(index) = self.strings.iter().position(|lit| lit.value == value) {
            return StrId(index);
        }

        let name = if self.strings.is_empty() {
            ".str".to_owned()
        } else {
            format!(".str.{}", self.strings.len())
        };
        self.strings.push(StrLit {
            name,
            value: value.to_owned(),
        });
        StrId(self.strings.len() - 1)
    }

    /// Type of a value in the context of one function.
    pub fn value_type(&self, func: FuncId, value: &Value) -> IrType {
        match value {
            Value::ConstInt { bits, .. } => match bits {
                1 => IrType::I1,
                8 => IrType::I8,
                _ => IrType::I32,
            },
            Value::ConstFloat(_) => IrType::F32,
            Value::Param(index) => self.function(func).params[*index].ty.clone(),
            Value::Str(_) => IrType::I8.ptr_to(),
            Value::Global(id) => self.globals[id.0].ty.clone().ptr_to(),
            Value::Inst(id) => self.function(func).inst(*id).ty.clone(),
        }
    }
}
