//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    /// Missing or unrecognized verb, handled before any command runs.
    #[error("{0}")]
    Dispatch(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Dispatch(_) | CliError::Infra(_) => crate::exitcode::FAILURE,
        }
    }

    /// Whether usage help should follow the error message.
    pub fn wants_usage(&self) -> bool {
        matches!(self, CliError::Dispatch(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn given_runtime_start_failure_when_wrapped_then_exit_one_without_usage() {
        let err: CliError = InfraError::io(
            "start async runtime",
            io::Error::new(io::ErrorKind::Other, "no threads"),
        )
        .into();

        assert!(matches!(err, CliError::Infra(_)));
        assert_eq!(
            err.to_string(),
            "I/O error: start async runtime: no threads"
        );
        assert_eq!(err.exit_code(), crate::exitcode::FAILURE);
        assert!(!err.wants_usage());
    }

    #[test]
    fn given_dispatch_error_then_usage_follows() {
        let err = CliError::Dispatch("empty/missing command".into());
        assert!(err.wants_usage());
        assert_eq!(err.exit_code(), crate::exitcode::FAILURE);
    }
}
