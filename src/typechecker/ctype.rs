use std::fmt::Display;

use crate::ast::TypeKeyword;

/// The scalar types of the source language. `Ellipsis` only ever occurs as
/// the last parameter of a variadic function type; it is not a value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleType {
    Int,
    Float,
    Char,
    Bool,
    Void,
    Ellipsis,
}

impl From<TypeKeyword> for SimpleType {
    fn from(keyword: TypeKeyword) -> Self {
        match keyword {
            TypeKeyword::Int => SimpleType::Int,
            TypeKeyword::Float => SimpleType::Float,
            TypeKeyword::Char => SimpleType::Char,
            TypeKeyword::Bool => SimpleType::Bool,
            TypeKeyword::Void => SimpleType::Void,
        }
    }
}

impl Display for SimpleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SimpleType::Int => "int",
            SimpleType::Float => "float",
            SimpleType::Char => "char",
            SimpleType::Bool => "bool",
            SimpleType::Void => "void",
            SimpleType::Ellipsis => "...",
        })
    }
}

/// A type a value (or statement) of the source language can have. Two types
/// are equal exactly when their canonical printed forms are equal; the
/// derived equality coincides with that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CType {
    Simple(SimpleType),
    Pointer { depth: usize, element: SimpleType },
    Function {
        params: Vec<CType>,
        return_type: Box<CType>,
    },
}

impl Display for CType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CType::Simple(simple) => write!(f, "{simple}"),
            CType::Pointer { depth, element } => {
                write!(f, "{element}{}", "*".repeat(*depth))
            }
            CType::Function {
                params,
                return_type,
            } => {
                let params = params
                    .iter()
                    .map(|param| param.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{return_type}({params})")
            }
        }
    }
}

impl CType {
    /// A scalar or pointer type: pointer depth 0 denotes the plain scalar.
    pub fn scalar(element: SimpleType, pointer_depth: usize) -> CType {
        if pointer_depth == 0 {
            CType::Simple(element)
        } else {
            CType::Pointer {
                depth: pointer_depth,
                element,
            }
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, CType::Simple(SimpleType::Void))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, CType::Function { .. })
    }

    /// Merge two statement types. `void` means "this statement can not
    /// return", so it is the identity; equal types merge to themselves;
    /// everything else is incompatible.
    pub fn merge(&self, other: &CType) -> Option<CType> {
        if self.is_void() {
            return Some(other.clone());
        }
        if other.is_void() {
            return Some(self.clone());
        }
        if self == other {
            return Some(self.clone());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int() -> CType {
        CType::Simple(SimpleType::Int)
    }

    fn void() -> CType {
        CType::Simple(SimpleType::Void)
    }

    #[test]
    fn test_merge_void_is_identity() {
        assert_eq!(void().merge(&int()), Some(int()));
        assert_eq!(int().merge(&void()), Some(int()));
        assert_eq!(void().merge(&void()), Some(void()));
    }

    #[test]
    fn test_merge_is_idempotent_on_equal_types() {
        assert_eq!(int().merge(&int()), Some(int()));

        let string = CType::Pointer {
            depth: 1,
            element: SimpleType::Char,
        };
        assert_eq!(string.merge(&string), Some(string.clone()));
    }

    #[test]
    fn test_merge_is_commutative() {
        let bool_ = CType::Simple(SimpleType::Bool);
        assert_eq!(int().merge(&bool_), bool_.merge(&int()));
        assert_eq!(int().merge(&void()), void().merge(&int()));
    }

    #[test]
    fn test_merge_rejects_distinct_types() {
        assert_eq!(int().merge(&CType::Simple(SimpleType::Bool)), None);

        let int_ptr = CType::Pointer {
            depth: 1,
            element: SimpleType::Int,
        };
        assert_eq!(int().merge(&int_ptr), None);
    }

    #[test]
    fn test_canonical_form_distinguishes_types() {
        let f = CType::Function {
            params: vec![int(), CType::Simple(SimpleType::Ellipsis)],
            return_type: Box::new(int()),
        };
        assert_eq!(f.to_string(), "int(int, ...)");

        let deep = CType::Pointer {
            depth: 2,
            element: SimpleType::Char,
        };
        assert_eq!(deep.to_string(), "char**");

        assert_ne!(
            CType::scalar(SimpleType::Int, 1),
            CType::scalar(SimpleType::Int, 2)
        );
    }
}
