//! End-to-end scenarios driving the compiler binary.

use std::{error::Error, process::Command};

use test_utils::{compile_err, compile_ok};

#[test]
fn test_minimal_main() -> Result<(), Box<dyn Error>> {
    let ir = compile_ok("int main() { return 0; }")?;

    assert!(ir.contains("define i32 @main()"), "{ir}");
    assert!(ir.contains("ret i32 0"), "{ir}");

    Ok(())
}

#[test]
fn test_promoted_call_argument() -> Result<(), Box<dyn Error>> {
    let ir = compile_ok("int f(int x) { return x + 1; }\nint main() { return f(41); }")?;

    assert!(ir.contains("call i32 @f(i32 41)"), "{ir}");
    // both the parameter slot of f and any locals of main are promoted
    assert!(!ir.contains("alloca"), "{ir}");

    Ok(())
}

#[test]
fn test_folds_through_memory() -> Result<(), Box<dyn Error>> {
    let ir = compile_ok("int main() { int a; a = 2; a = a + 3; return a; }")?;

    assert!(ir.contains("ret i32 5"), "{ir}");
    assert!(!ir.contains("alloca"), "{ir}");
    assert!(!ir.contains("add"), "{ir}");

    Ok(())
}

#[test]
fn test_both_arms_return() -> Result<(), Box<dyn Error>> {
    let ir = compile_ok("int main() { if (1 > 0) return 1; else return 2; }")?;

    assert!(ir.contains("ret i32 1"), "{ir}");
    assert!(ir.contains("ret i32 2"), "{ir}");
    // the join block is empty and nothing branches to it, so it is gone
    assert!(!ir.contains("merge"), "{ir}");

    Ok(())
}

#[test]
fn test_return_type_mismatch_is_rejected() -> Result<(), Box<dyn Error>> {
    let stderr = compile_err("int main() { bool b; return b; }")?;

    assert!(stderr.contains("[Line No 1]"), "{stderr}");
    assert!(stderr.contains("'bool'"), "{stderr}");

    Ok(())
}

#[test]
fn test_wrong_arity_is_rejected() -> Result<(), Box<dyn Error>> {
    let stderr = compile_err("int f();\nint main() { return f(1); }")?;

    assert!(stderr.contains("incompatible number of arguments"), "{stderr}");

    Ok(())
}

#[test]
fn test_shadowing_in_inner_scope() -> Result<(), Box<dyn Error>> {
    let ir = compile_ok("int main() { int x; { int x; } return 0; }")?;

    assert!(ir.contains("ret i32 0"), "{ir}");

    Ok(())
}

#[test]
fn test_usage_without_arguments() -> Result<(), Box<dyn Error>> {
    let output = Command::new("./target/debug/minicc").output()?;

    assert!(!output.status.success());

    Ok(())
}

#[test]
fn test_parse_error_exits_nonzero() -> Result<(), Box<dyn Error>> {
    let stderr = compile_err("int main() { return 0 }")?;

    assert!(stderr.contains("failed to parse"), "{stderr}");

    Ok(())
}
