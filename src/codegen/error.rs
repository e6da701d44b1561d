use std::{error::Error, fmt::Display};

use crate::{ast::Position, ir::VerifyError};

#[derive(Debug, Clone, PartialEq)]
pub struct CodegenError {
    pub message: String,
    pub position: Option<Position>,
}

impl Display for CodegenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.position {
            Some((_, line, _)) => write!(f, "[Line No {line}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl Error for CodegenError {}

impl From<VerifyError> for CodegenError {
    fn from(error: VerifyError) -> Self {
        CodegenError {
            message: error.to_string(),
            position: None,
        }
    }
}
