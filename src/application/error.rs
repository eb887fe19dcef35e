//! Application-level errors (wraps domain errors)

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::application::command::Stage;
use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("invalid json in config file ({}): {source}", .path.display())]
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config error: {message}")]
    Config { message: String },

    /// Failure raised by a command object itself.
    #[error("{0}")]
    Command(String),

    /// Any failure of `pre_execute`, `execute` or `dispose`, returned or panicked.
    #[error("{message}")]
    CommandStage { stage: Stage, message: String },

    #[error("{context}: {source}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// Attribute this error to a lifecycle stage.
    ///
    /// Command stages collapse every error into `CommandStage`, keeping its message.
    /// Root resolution and config loading keep their structured errors.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            e @ ApplicationError::CommandStage { .. } => e,
            e if stage.is_command_stage() => ApplicationError::CommandStage {
                stage,
                message: e.to_string(),
            },
            e => e,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

/// Extension trait for converting `io::Result` to `ApplicationResult` with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// fs.list_dir(&dir).with_path_context("list directory", &dir)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}
