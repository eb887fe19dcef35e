//! Infrastructure-level errors
//!
//! Application failures never reach this layer: the runner reports them and
//! terminates. What is left is the process plumbing around it.

use thiserror::Error;

/// Infrastructure errors: I/O-level failures outside the command lifecycle.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl InfraError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
