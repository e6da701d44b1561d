//! Lowering and optimizer tests against the library API.

use minicc::{
    ast::{Ast, CParser},
    binder::Binder,
    codegen::Codegen,
    ir::{verify_module, InstKind, Module},
    optimizer,
    typechecker::Typechecker,
};

fn lower(source: &str) -> Module {
    let ast = parse(source);
    Binder::new().check(&ast).expect("binding failed");
    let typed = Typechecker::new().check(&ast).expect("typing failed");
    Codegen::new().lower(&typed).expect("lowering failed")
}

fn parse(source: &str) -> Ast<()> {
    let program = CParser::parse_program(source).expect("failed to parse");
    Ast::from_program(program, "test.c")
}

const LOOPY: &str = "int main() { int i; i = 0; while (i < 10) { int j; j = i; i = j + 1; if (i == 5) return i; } return i; }";

#[test]
fn test_every_block_has_exactly_one_terminator() {
    let module = lower(LOOPY);

    for function in &module.functions {
        if function.is_declaration() {
            continue;
        }
        for &block in function.layout() {
            let insts = &function.block(block).insts;
            let terminators = insts
                .iter()
                .filter(|&&id| function.inst(id).is_terminator())
                .count();

            assert_eq!(terminators, 1, "in block '{}'", function.block(block).label);
            assert!(function.inst(*insts.last().unwrap()).is_terminator());
        }
    }

    verify_module(&module).unwrap();
}

#[test]
fn test_allocas_only_live_in_the_entry_block() {
    let module = lower(LOOPY);

    for function in &module.functions {
        if function.is_declaration() {
            continue;
        }
        for &block in function.layout().iter().skip(1) {
            for &id in &function.block(block).insts {
                assert!(
                    !matches!(function.inst(id).kind, InstKind::Alloca { .. }),
                    "alloca outside the entry block of '{}'",
                    function.name
                );
            }
        }
    }
}

#[test]
fn test_string_literals_are_interned() {
    let module = lower(
        "int puts(char* s);\nint main() { puts(\"hi\"); puts(\"hi\"); puts(\"other\"); return 0; }",
    );

    assert_eq!(module.strings.len(), 2);
}

#[test]
fn test_void_functions_get_an_implicit_return() {
    let module = lower("void touch(int x) { x = 1; }\nint main() { return 0; }");

    let printed = module.to_string();
    assert!(printed.contains("ret void"), "{printed}");
}

#[test]
fn test_globals_lower_to_module_globals() {
    let module = lower("int g;\nint main() { g = 3; return g; }");

    assert_eq!(module.globals.len(), 1);
    let printed = module.to_string();
    assert!(printed.contains("@g = global i32"), "{printed}");
    assert!(printed.contains("store i32 3, i32* @g"), "{printed}");
}

#[test]
fn test_function_declarations_print_as_declares() {
    let module = lower("int printf(char* fmt, ...);\nint main() { return 0; }");

    let printed = module.to_string();
    assert!(printed.contains("declare i32 @printf(i8*, ...)"), "{printed}");
}

#[test]
fn test_optimizer_reaches_a_fixed_point() {
    let mut module = lower(LOOPY);

    optimizer::optimize(&mut module).unwrap();
    verify_module(&module).unwrap();

    // a second run has nothing left to do
    let before = module.clone();
    optimizer::optimize(&mut module).unwrap();
    assert_eq!(before, module);
}

#[test]
fn test_optimizer_keeps_observable_behavior() {
    let mut module = lower("int main() { int a; a = 2; a = a + 3; return a; }");

    optimizer::optimize(&mut module).unwrap();

    let printed = module.to_string();
    assert!(printed.contains("ret i32 5"), "{printed}");
}

#[test]
fn test_compound_assignment_yields_the_old_value() {
    // b = (a += 40) reads the pre-op value of a
    let mut module =
        lower("int main() { int a; int b; a = 2; b = (a += 40); return b; }");

    optimizer::optimize(&mut module).unwrap();

    let printed = module.to_string();
    assert!(printed.contains("ret i32 2"), "{printed}");
}

#[test]
fn test_increment_forms() {
    let mut module = lower("int main() { int a; a = 1; a++; ++a; return a; }");

    optimizer::optimize(&mut module).unwrap();

    let printed = module.to_string();
    assert!(printed.contains("ret i32 3"), "{printed}");
}
