//! The mite commands
//!
//! Each command is a small struct holding the boundary implementations it
//! needs plus its parsed options. The dispatcher builds one and hands it to
//! the runner.

mod audit;
mod create;
mod down;
mod init;
mod status;
mod up;

use std::sync::Arc;

pub use audit::{AuditCommand, AuditReport};
pub use create::{CreateCommand, CreateOptions};
pub use down::{DownCommand, DownOptions, StepDownCommand};
pub use init::{InitCommand, InitOutcome};
pub use status::{StatusCommand, StatusLine, StatusReport};
pub use up::{StepUpCommand, UpCommand};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Configuration;
use crate::infrastructure::traits::FileSystem;

/// Pass the configuration through if its migration directory exists.
fn require_migration_root(
    fs: &dyn FileSystem,
    config: Arc<Configuration>,
) -> ApplicationResult<Arc<Configuration>> {
    if fs.is_dir(&config.migration_root) {
        Ok(config)
    } else {
        Err(ApplicationError::Command(format!(
            "migration directory not found: {} (run `mite init` first)",
            config.migration_root.display()
        )))
    }
}
