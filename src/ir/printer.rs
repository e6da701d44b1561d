//! Textual form of the IR, loosely modelled on LLVM assembly.
//!
//! Named stack slots keep their (uniquified) source names; every other
//! result is numbered per function in layout order.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

use super::{FuncId, Function, Inst, InstId, InstKind, IrType, Module, Value};

impl Display for Module {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for global in &self.globals {
            writeln!(f, "@{} = global {} zeroinitializer", global.name, global.ty)?;
        }

        for literal in &self.strings {
            writeln!(
                f,
                "@{} = private constant [{} x i8] c\"{}\\00\"",
                literal.name,
                literal.value.len() + 1,
                escape(&literal.value)
            )?;
        }

        if !self.globals.is_empty() || !self.strings.is_empty() {
            writeln!(f)?;
        }

        for (index, function) in self.functions.iter().enumerate() {
            print_function(f, self, FuncId(index), function)?;
            writeln!(f)?;
        }

        Ok(())
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::new();
    for byte in value.bytes() {
        if (0x20..0x7f).contains(&byte) && byte != b'"' && byte != b'\\' {
            escaped.push(byte as char);
        } else {
            escaped.push_str(&format!("\\{byte:02X}"));
        }
    }
    escaped
}

fn signature(function: &Function, with_names: bool) -> String {
    let mut params = function
        .params
        .iter()
        .map(|param| {
            if with_names {
                format!("{} %{}", param.ty, param.name)
            } else {
                param.ty.to_string()
            }
        })
        .collect::<Vec<_>>();

    if function.variadic {
        params.push("...".to_owned());
    }

    format!("{} @{}({})", function.ret, function.name, params.join(", "))
}

fn print_function(
    f: &mut Formatter<'_>,
    module: &Module,
    func: FuncId,
    function: &Function,
) -> fmt::Result {
    if function.is_declaration() {
        return writeln!(f, "declare {}", signature(function, false));
    }

    writeln!(f, "define {} {{", signature(function, true))?;

    let names = assign_names(function);

    for &block in function.layout() {
        writeln!(f, "{}:", function.block(block).label)?;

        for &id in &function.block(block).insts {
            writeln!(
                f,
                "  {}",
                inst_text(module, func, function, &names, id)
            )?;
        }
    }

    writeln!(f, "}}")
}

/// Pick a printed name for every result-producing instruction. Name hints
/// win; collisions and anonymous results get numbered.
fn assign_names(function: &Function) -> HashMap<InstId, String> {
    let mut names = HashMap::new();
    let mut taken: HashMap<String, usize> = function
        .params
        .iter()
        .map(|param| (param.name.clone(), 1))
        .collect();
    let mut counter = 0;

    for (_, id) in function.live_insts() {
        let inst = function.inst(id);
        if !inst.has_result() {
            continue;
        }

        let name = match &inst.name {
            Some(hint) => {
                let uses = taken.entry(hint.clone()).or_insert(0);
                *uses += 1;
                if *uses == 1 {
                    hint.clone()
                } else {
                    format!("{hint}{}", *uses - 1)
                }
            }
            None => {
                let name = counter.to_string();
                counter += 1;
                name
            }
        };

        names.insert(id, name);
    }

    names
}

fn value_text(module: &Module, names: &HashMap<InstId, String>, function: &Function, value: &Value) -> String {
    match value {
        Value::ConstInt { value, .. } => value.to_string(),
        Value::ConstFloat(value) => value.to_string(),
        Value::Param(index) => format!("%{}", function.params[*index].name),
        Value::Str(id) => format!("@{}", module.strings[id.0].name),
        Value::Global(id) => format!("@{}", module.globals[id.0].name),
        Value::Inst(id) => match names.get(id) {
            Some(name) => format!("%{name}"),
            None => "%?".to_owned(),
        },
    }
}

fn typed_text(
    module: &Module,
    func: FuncId,
    names: &HashMap<InstId, String>,
    function: &Function,
    value: &Value,
) -> String {
    format!(
        "{} {}",
        module.value_type(func, value),
        value_text(module, names, function, value)
    )
}

fn inst_text(
    module: &Module,
    func: FuncId,
    function: &Function,
    names: &HashMap<InstId, String>,
    id: InstId,
) -> String {
    let inst = function.inst(id);

    let result = |inst: &Inst| match names.get(&id) {
        Some(name) => format!("%{name} = "),
        None if inst.has_result() => "%? = ".to_owned(),
        None => String::new(),
    };

    let typed = |value: &Value| typed_text(module, func, names, function, value);
    let plain = |value: &Value| value_text(module, names, function, value);

    match &inst.kind {
        InstKind::Alloca { allocated } => format!("{}alloca {allocated}", result(inst)),
        InstKind::Load { ptr } => {
            format!("{}load {}, {}", result(inst), inst.ty, typed(ptr))
        }
        InstKind::Store { value, ptr } => format!("store {}, {}", typed(value), typed(ptr)),
        InstKind::Binary { op, lhs, rhs } => format!(
            "{}{op} {}, {}",
            result(inst),
            typed(lhs),
            plain(rhs)
        ),
        InstKind::Icmp { pred, lhs, rhs } => format!(
            "{}icmp {pred} {}, {}",
            result(inst),
            typed(lhs),
            plain(rhs)
        ),
        InstKind::Unary { op, operand } => {
            format!("{}{op} {}", result(inst), typed(operand))
        }
        InstKind::Call { callee, args } => {
            let callee = module.function(*callee);
            let args = args.iter().map(typed).collect::<Vec<_>>().join(", ");
            let call = format!("call {} @{}({args})", callee.ret, callee.name);
            if inst.ty == IrType::Void {
                call
            } else {
                format!("{}{call}", result(inst))
            }
        }
        InstKind::Ret { value } => match value {
            Some(value) => format!("ret {}", typed(value)),
            None => "ret void".to_owned(),
        },
        InstKind::Br { target } => format!("br label %{}", function.block(*target).label),
        InstKind::CondBr {
            cond,
            then_target,
            else_target,
        } => format!(
            "br {}, label %{}, label %{}",
            typed(cond),
            function.block(*then_target).label,
            function.block(*else_target).label
        ),
    }
}
