pub mod ast;
pub mod binder;
pub mod codegen;
pub mod ir;
pub mod optimizer;
pub mod symbols;
pub mod typechecker;
