use std::{fmt::Display, str::FromStr};

use super::{Expression, Position};

/// The assignment operators, simple and compound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    And,
    Xor,
    Or,
}

pub struct AssignOpParseError(pub String);

impl FromStr for AssignOp {
    type Err = AssignOpParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(Self::Assign),
            "+=" => Ok(Self::Add),
            "-=" => Ok(Self::Sub),
            "*=" => Ok(Self::Mul),
            "/=" => Ok(Self::Div),
            "%=" => Ok(Self::Rem),
            "<<=" => Ok(Self::Shl),
            ">>=" => Ok(Self::Shr),
            "&=" => Ok(Self::And),
            "^=" => Ok(Self::Xor),
            "|=" => Ok(Self::Or),
            _ => Err(AssignOpParseError(format!(
                "invalid assignment operator '{s}'"
            ))),
        }
    }
}

impl Display for AssignOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Rem => "%=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::And => "&=",
            AssignOp::Xor => "^=",
            AssignOp::Or => "|=",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment<T> {
    pub lhs: Expression<T>,
    pub op: AssignOp,
    pub rhs: Expression<T>,
    pub position: Position,
    pub info: T,
}
