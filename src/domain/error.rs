//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the project model.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("not a mite project (or any of the parent directories): {}", .filenames.join(", "))]
    NotAProject { filenames: Vec<String> },

    #[error("{command} is a potentially dangerous operation; rerun with --confirm")]
    ConfirmationRequired { command: String },

    #[error("migration already exists: {0}")]
    MigrationExists(String),
}
