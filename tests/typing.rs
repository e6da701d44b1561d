//! Typing tests against the library API.

use minicc::{
    ast::{Ast, CParser, ExternalDecl},
    binder::Binder,
    typechecker::{CType, SimpleType, TypeError, TypeInfo, Typechecker},
};

fn parse(source: &str) -> Ast<()> {
    let program = CParser::parse_program(source).expect("failed to parse");
    Ast::from_program(program, "test.c")
}

fn typecheck(source: &str) -> Result<Ast<TypeInfo>, Vec<TypeError>> {
    let ast = parse(source);
    Binder::new().check(&ast).expect("binding failed");
    Typechecker::new().check(&ast)
}

#[test]
fn test_return_type_mismatch() {
    let errors = typecheck("int main() { bool b; return b; }").unwrap_err();

    assert_eq!(errors.len(), 1);
    assert!(errors[0]
        .message
        .contains("declared to return 'int' but its body returns 'bool'"));
}

#[test]
fn test_statement_types_merge_through_branches() {
    let typed = typecheck("int main() { if (1 > 0) return 1; return 2; }").unwrap();

    let ExternalDecl::FunctionDef(main) = &typed.items()[0] else {
        panic!("expected a function definition")
    };
    assert_eq!(main.body.info.ctype, CType::Simple(SimpleType::Int));
}

#[test]
fn test_incompatible_branch_types() {
    let errors = typecheck("int main() { if (1 > 0) return 1; else return 1.5; }").unwrap_err();

    assert!(errors[0].message.contains("incompatible types"));
}

#[test]
fn test_condition_has_to_be_bool() {
    let errors = typecheck("int main() { if (1) return 1; return 0; }").unwrap_err();

    assert!(errors[0].message.contains("invalid type 'int' of condition"));

    let errors = typecheck("int main() { while (1) return 1; return 0; }").unwrap_err();

    assert!(errors[0].message.contains("invalid type 'int' of condition"));
}

#[test]
fn test_assignment_types_have_to_match() {
    let errors = typecheck("int main() { int a; a = 1.5; return 0; }").unwrap_err();

    assert!(errors[0]
        .message
        .contains("can not assign a value of type 'float' to 'int'"));
}

#[test]
fn test_binary_operands_have_to_match() {
    let errors = typecheck("int main() { if (1 < 1.5) return 1; return 0; }").unwrap_err();

    assert!(errors[0].message.contains("operands of '<' do not match"));
}

#[test]
fn test_logical_not_requires_bool() {
    let errors = typecheck("int main() { return !1; }").unwrap_err();

    assert!(errors[0].message.contains("invalid type 'int' for operator '!'"));
}

#[test]
fn test_string_literals_are_char_pointers() {
    let typed = typecheck("char* greeting() { return \"hi\"; }").unwrap();

    let ExternalDecl::FunctionDef(greeting) = &typed.items()[0] else {
        panic!("expected a function definition")
    };
    assert_eq!(
        greeting.body.info.ctype,
        CType::Pointer {
            depth: 1,
            element: SimpleType::Char,
        }
    );
}

#[test]
fn test_variadic_declaration_accepts_a_tail() {
    let source = "int printf(char* fmt, ...);\nint main() { printf(\"%d\", 1, 2); return 0; }";

    assert!(typecheck(source).is_ok());
}

#[test]
fn test_variadic_call_still_needs_the_fixed_arguments() {
    let source = "int printf(char* fmt, ...);\nint main() { printf(); return 0; }";

    let errors = typecheck(source).unwrap_err();
    assert!(errors[0].message.contains("incompatible number of arguments"));
}

#[test]
fn test_variadic_fixed_arguments_are_typed() {
    let source = "int printf(char* fmt, ...);\nint main() { printf(1); return 0; }";

    let errors = typecheck(source).unwrap_err();
    assert!(errors[0].message.contains("incompatible argument type"));
}

#[test]
fn test_ellipsis_is_rejected_in_definitions() {
    let errors = typecheck("int f(int x, ...) { return x; }").unwrap_err();

    assert!(errors[0].message.contains("ellipsis is not allowed"));
}

#[test]
fn test_function_declarations_below_global_scope() {
    let errors = typecheck("int main() { int g(); return 0; }").unwrap_err();

    assert!(errors[0].message.contains("declared at global scope"));
}

#[test]
fn test_exact_call_arity_and_types() {
    let source = "int f(int a, int b) { return a + b; }\nint main() { return f(1, 2); }";
    assert!(typecheck(source).is_ok());

    let source = "int f(int a, int b) { return a + b; }\nint main() { return f(1); }";
    let errors = typecheck(source).unwrap_err();
    assert!(errors[0].message.contains("incompatible number of arguments"));

    let source = "int f(int a, int b) { return a + b; }\nint main() { return f(1, 1.5); }";
    let errors = typecheck(source).unwrap_err();
    assert!(errors[0].message.contains("incompatible argument type"));
}

#[test]
fn test_comparisons_yield_bool() {
    let source = "bool positive(int x) { return x > 0; }";

    assert!(typecheck(source).is_ok());
}

#[test]
fn test_expression_statements_contribute_void() {
    // the call result is discarded; the compound still types as int
    let source = "int f() { return 1; }\nint main() { f(); return 0; }";

    assert!(typecheck(source).is_ok());
}
