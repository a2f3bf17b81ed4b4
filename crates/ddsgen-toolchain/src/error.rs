//! Error types for external tool invocation

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for toolchain operations
pub type ToolchainResult<T> = Result<T, ToolchainError>;

/// Errors raised while running an external tool
#[derive(Error, Debug)]
pub enum ToolchainError {
    /// The process could not be started (missing executable, permissions)
    #[error("cannot execute {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran and reported failure
    #[error("{program} returned an error (exit code {code})")]
    NonZeroExit { program: String, code: i32 },

    /// The redirect target could not be written
    #[error("cannot write {}: {source}", path.display())]
    Redirect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the process output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The async runtime could not be created or a drain task failed
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl ToolchainError {
    /// Exit code for a failed run, if the process got that far
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ToolchainError::NonZeroExit { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn ToolchainError___non_zero_exit___displays_program_and_code() {
        let err = ToolchainError::NonZeroExit {
            program: "cpp".to_string(),
            code: 1,
        };

        assert_eq!(err.to_string(), "cpp returned an error (exit code 1)");
        assert_eq!(err.exit_code(), Some(1));
    }

    #[test]
    fn ToolchainError___launch___keeps_source() {
        let err = ToolchainError::Launch {
            program: "javah".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };

        assert!(err.to_string().starts_with("cannot execute javah"));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.exit_code(), None);
    }
}
