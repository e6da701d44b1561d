use std::{fmt::Display, str::FromStr};

/// Binary operators of the source language, ordered roughly by precedence
/// tier. Function calls are their own node kind ([`super::Call`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Plus,
    Minus,
    Mult,
    Div,
    Mod,
    Or,
    And,
    Xor,
    Shl,
    Shr,
    Gt,
    Gte,
    Lt,
    Lte,
    Equal,
    NotEqual,
    LogicalOr,
    LogicalAnd,
}

pub struct BinaryOpParseError(pub String);

impl FromStr for BinaryOp {
    type Err = BinaryOpParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Self::Plus),
            "-" => Ok(Self::Minus),
            "*" => Ok(Self::Mult),
            "/" => Ok(Self::Div),
            "%" => Ok(Self::Mod),
            "|" => Ok(Self::Or),
            "&" => Ok(Self::And),
            "^" => Ok(Self::Xor),
            "<<" => Ok(Self::Shl),
            ">>" => Ok(Self::Shr),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Gte),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Lte),
            "==" => Ok(Self::Equal),
            "!=" => Ok(Self::NotEqual),
            "||" => Ok(Self::LogicalOr),
            "&&" => Ok(Self::LogicalAnd),
            _ => Err(BinaryOpParseError(format!("invalid binary operator '{s}'"))),
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Mult => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Or => "|",
            BinaryOp::And => "&",
            BinaryOp::Xor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LogicalOr => "||",
            BinaryOp::LogicalAnd => "&&",
        })
    }
}

impl BinaryOp {
    /// Whether this operator is one of the six comparisons.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Gt
                | BinaryOp::Gte
                | BinaryOp::Lt
                | BinaryOp::Lte
                | BinaryOp::Equal
                | BinaryOp::NotEqual
        )
    }

    /// Whether this operator is `&&` or `||`.
    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::LogicalOr | BinaryOp::LogicalAnd)
    }
}
