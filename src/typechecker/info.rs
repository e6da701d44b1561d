use super::CType;

/// Type information attached to every AST node by the typing pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    pub ctype: CType,
}
