//! Helpers for the integration tests: write a source snippet to a file and
//! run the built compiler binary over it.

use std::{
    env,
    error::Error,
    fs, io,
    path::PathBuf,
    process::{Command, Output},
    str,
    sync::atomic::{AtomicUsize, Ordering},
};

const MINICC_PATH: &str = "./target/debug/minicc";

static NEXT_FILE_ID: AtomicUsize = AtomicUsize::new(0);

/// Outcome of one compiler invocation.
pub struct Compilation {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

fn write_source(source: &str) -> Result<PathBuf, io::Error> {
    let id = NEXT_FILE_ID.fetch_add(1, Ordering::SeqCst);
    let path = env::temp_dir().join(format!("minicc-test-{}-{id}.c", std::process::id()));
    fs::write(&path, source)?;
    Ok(path)
}

fn run_compiler(path: &PathBuf) -> Result<Output, io::Error> {
    Command::new(MINICC_PATH).arg(path).output()
}

/// Compile a source snippet with the compiler binary.
pub fn compile(source: &str) -> Result<Compilation, Box<dyn Error>> {
    let path = write_source(source)?;
    let output = run_compiler(&path)?;
    let _ = fs::remove_file(&path);

    Ok(Compilation {
        stdout: str::from_utf8(&output.stdout)?.to_owned(),
        stderr: str::from_utf8(&output.stderr)?.to_owned(),
        success: output.status.success(),
    })
}

/// Assert that a snippet compiles cleanly and return the emitted IR.
pub fn compile_ok(source: &str) -> Result<String, Box<dyn Error>> {
    let compilation = compile(source)?;

    assert!(
        compilation.success,
        "compiler exited with a failure status:\n{}",
        compilation.stderr
    );
    assert!(compilation.stderr.is_empty(), "{}", compilation.stderr);

    Ok(compilation.stdout)
}

/// Assert that a snippet is rejected and return the diagnostics.
pub fn compile_err(source: &str) -> Result<String, Box<dyn Error>> {
    let compilation = compile(source)?;

    assert!(
        !compilation.success,
        "expected a failing exit status, got IR:\n{}",
        compilation.stdout
    );

    Ok(compilation.stderr)
}
