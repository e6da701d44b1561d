//! Name-resolution tests against the library API.

use minicc::{
    ast::{Ast, CParser},
    binder::Binder,
};

fn parse(source: &str) -> Ast<()> {
    let program = CParser::parse_program(source).expect("failed to parse");
    Ast::from_program(program, "test.c")
}

#[test]
fn test_undefined_identifier_is_reported() {
    let ast = parse("int main() { return x; }");

    let errors = Binder::new().check(&ast).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("undefined identifier 'x'"));
}

#[test]
fn test_all_errors_of_the_phase_are_collected() {
    let ast = parse("int main() { return x + y; }");

    let errors = Binder::new().check(&ast).unwrap_err();
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_duplicate_declaration_names_the_previous_line() {
    let ast = parse("int main() {\n    int a;\n    int a;\n    return 0;\n}");

    let errors = Binder::new().check(&ast).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("declared twice"));
    assert!(errors[0].message.contains("line 2"));
    assert_eq!(errors[0].position.1, 3);
}

#[test]
fn test_inner_scopes_may_shadow() {
    let ast = parse("int main() { int x; { int x; } return 0; }");

    assert!(Binder::new().check(&ast).is_ok());
}

#[test]
fn test_parameters_share_the_body_scope() {
    let ast = parse("int f(int x) { int x; return 0; }");

    let errors = Binder::new().check(&ast).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("declared twice"));
}

#[test]
fn test_parameters_of_plain_declarations_do_not_leak() {
    let ast = parse("int f(int x);\nint main() { return x; }");

    let errors = Binder::new().check(&ast).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("undefined identifier 'x'"));
}

#[test]
fn test_functions_can_call_themselves() {
    let ast = parse("int f(int n) { if (n > 0) return f(n - 1); return 0; }");

    assert!(Binder::new().check(&ast).is_ok());
}

#[test]
fn test_later_functions_see_earlier_names() {
    let ast = parse("int one() { return 1; }\nint main() { return one(); }");

    assert!(Binder::new().check(&ast).is_ok());
}
