//! Error types for the IDL front-end and semantic context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for front-end and context operations
pub type IdlResult<T> = Result<T, IdlError>;

/// Error type for everything that can go wrong between reading an IDL file and
/// registering its declarations
#[derive(Error, Debug)]
pub enum IdlError {
    /// The IDL (or preprocessed) file does not exist
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The source text does not match the grammar
    #[error("{file}:{line}: syntax error: {message}")]
    Syntax {
        file: String,
        line: u32,
        message: String,
    },

    /// A scoped name could not be resolved from the scope it was used in
    #[error("unresolved type '{name}' referenced from scope '{scope}'")]
    UnresolvedType { name: String, scope: String },

    /// The same scoped name was declared twice
    #[error("duplicate declaration of '{0}'")]
    DuplicateDeclaration(String),

    /// Any other I/O failure while reading sources
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IdlError {
    /// Build a syntax error at a source position
    pub fn syntax(file: impl Into<String>, line: u32, message: impl Into<String>) -> Self {
        IdlError::Syntax {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[path = "error/error_tests.rs"]
mod error_tests;
