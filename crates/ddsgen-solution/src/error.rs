//! Error types for platform and backend selection.

use thiserror::Error;

/// Errors raised while configuring a solution.
#[derive(Debug, Error)]
pub enum SolutionError {
    /// The platform is not in the active platform list.
    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    /// The platform is known but no build backend can be derived from it.
    #[error("No build backend for platform: {0}")]
    UnsupportedBackend(String),
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn SolutionError___unknown_platform___displays_id() {
        let err = SolutionError::UnknownPlatform("ppcAix".to_string());

        assert_eq!(err.to_string(), "Unknown platform: ppcAix");
    }

    #[test]
    fn SolutionError___unsupported_backend___displays_id() {
        let err = SolutionError::UnsupportedBackend("ppcWinXP".to_string());

        assert_eq!(err.to_string(), "No build backend for platform: ppcWinXP");
    }
}
