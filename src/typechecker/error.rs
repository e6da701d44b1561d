use std::{error::Error, fmt::Display};

use crate::ast::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct TypeError {
    pub message: String,
    pub position: Position,
}

impl Display for TypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (_, line, _) = &self.position;
        write!(f, "[Line No {line}] {}", self.message)
    }
}

impl Error for TypeError {}
