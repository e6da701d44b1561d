use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
    Not,
    LogicalNot,
}

pub struct UnaryOpParseError(pub String);

impl FromStr for UnaryOp {
    type Err = UnaryOpParseError;

    /// Parses the prefix spelling; the postfix forms are produced by the
    /// postfix walk in [`super::Expression::from_pair`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Self::Plus),
            "-" => Ok(Self::Neg),
            "++" => Ok(Self::PreInc),
            "--" => Ok(Self::PreDec),
            "~" => Ok(Self::Not),
            "!" => Ok(Self::LogicalNot),
            _ => Err(UnaryOpParseError(format!("invalid unary operator '{s}'"))),
        }
    }
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
            UnaryOp::PreInc => "++",
            UnaryOp::PreDec => "--",
            UnaryOp::PostInc => "++",
            UnaryOp::PostDec => "--",
            UnaryOp::Not => "~",
            UnaryOp::LogicalNot => "!",
        })
    }
}
