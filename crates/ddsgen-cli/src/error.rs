//! Error types for a generation run

use ddsgen_core::IdlError;
use ddsgen_solution::SolutionError;
use ddsgen_toolchain::ToolchainError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for generation
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Errors raised while generating a unit or a build backend
#[derive(Error, Debug)]
pub enum GenerateError {
    /// Invalid configuration or an unusable platform
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The IDL front-end rejected the unit
    #[error(transparent)]
    FrontEnd(#[from] IdlError),

    /// An external tool could not run or reported failure
    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    /// A template group is unknown or was given the wrong attributes
    #[error("template error: {0}")]
    Template(String),

    /// A generated file or directory could not be written
    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenerateError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error only fails the unit being processed. Anything else
    /// ends the run.
    pub fn is_unit_local(&self) -> bool {
        matches!(self, GenerateError::FrontEnd(_) | GenerateError::Toolchain(_))
    }
}

impl From<SolutionError> for GenerateError {
    fn from(err: SolutionError) -> Self {
        GenerateError::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn GenerateError___front_end_and_toolchain___are_unit_local() {
        let front_end = GenerateError::from(IdlError::FileNotFound("a.idl".into()));
        let toolchain = GenerateError::from(ToolchainError::NonZeroExit {
            program: "cpp".to_string(),
            code: 1,
        });

        assert!(front_end.is_unit_local());
        assert!(toolchain.is_unit_local());
    }

    #[test]
    fn GenerateError___io_and_template___end_the_run() {
        let io = GenerateError::io(
            "out/a.h",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let template = GenerateError::Template("unknown group".to_string());

        assert!(!io.is_unit_local());
        assert!(!template.is_unit_local());
        assert_eq!(io.to_string(), "cannot write out/a.h: denied");
    }

    #[test]
    fn GenerateError___from_solution_error___is_configuration() {
        let err = GenerateError::from(SolutionError::UnsupportedBackend("ppcAIX".to_string()));

        assert!(matches!(err, GenerateError::Configuration(_)));
        assert!(err.to_string().contains("ppcAIX"));
    }
}
