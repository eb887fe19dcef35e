//! `mite down` and `mite stepdown`: revert executed migrations, newest first
//!
//! Both refuse to run without `--confirm`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::application::command::Command;
use crate::application::commands::require_migration_root;
use crate::application::services::JournalService;
use crate::application::ApplicationResult;
use crate::config::Configuration;
use crate::domain::DomainError;
use crate::infrastructure::traits::{FileSystem, Reporter};

#[derive(Debug, Clone, Default)]
pub struct DownOptions {
    /// Confirm the potentially dangerous operation
    pub confirmed: bool,
}

fn check_confirmed(command: &str, options: &DownOptions) -> ApplicationResult<()> {
    if options.confirmed {
        Ok(())
    } else {
        Err(DomainError::ConfirmationRequired {
            command: command.to_string(),
        }
        .into())
    }
}

/// Revert up to `limit` executed migrations; all of them when `None`.
fn revert_executed(
    journal: &JournalService,
    limit: Option<usize>,
) -> ApplicationResult<Vec<String>> {
    let executed = journal.executed()?;
    let take = limit.unwrap_or(executed.len());

    let mut reverted = Vec::new();
    for entry in executed.iter().rev().take(take) {
        debug!("reverting {}", entry.id);
        journal.record_reverted(&entry.id)?;
        reverted.push(entry.id.clone());
    }
    Ok(reverted)
}

fn report_reverted(reporter: &dyn Reporter, reverted: &[String]) {
    if reverted.is_empty() {
        reporter.info("nothing to revert");
    }
    for id in reverted {
        reporter.info(&format!("reverted {id}"));
    }
}

pub struct DownCommand {
    fs: Arc<dyn FileSystem>,
    reporter: Arc<dyn Reporter>,
    options: DownOptions,
}

impl DownCommand {
    pub fn new(fs: Arc<dyn FileSystem>, reporter: Arc<dyn Reporter>, options: DownOptions) -> Self {
        Self {
            fs,
            reporter,
            options,
        }
    }
}

#[async_trait]
impl Command for DownCommand {
    type Input = Arc<Configuration>;
    type Output = Vec<String>;

    fn name(&self) -> &'static str {
        "down"
    }

    async fn pre_execute(
        &self,
        config: Arc<Configuration>,
    ) -> ApplicationResult<Arc<Configuration>> {
        check_confirmed(self.name(), &self.options)?;
        require_migration_root(self.fs.as_ref(), config)
    }

    async fn execute(&self, config: Arc<Configuration>) -> ApplicationResult<Vec<String>> {
        let journal = JournalService::new(self.fs.clone(), &config.migration_root);
        revert_executed(&journal, None)
    }

    async fn dispose(&self, reverted: Vec<String>) -> ApplicationResult<()> {
        report_reverted(self.reporter.as_ref(), &reverted);
        Ok(())
    }
}

pub struct StepDownCommand {
    fs: Arc<dyn FileSystem>,
    reporter: Arc<dyn Reporter>,
    options: DownOptions,
}

impl StepDownCommand {
    pub fn new(fs: Arc<dyn FileSystem>, reporter: Arc<dyn Reporter>, options: DownOptions) -> Self {
        Self {
            fs,
            reporter,
            options,
        }
    }
}

#[async_trait]
impl Command for StepDownCommand {
    type Input = Arc<Configuration>;
    type Output = Vec<String>;

    fn name(&self) -> &'static str {
        "stepdown"
    }

    async fn pre_execute(
        &self,
        config: Arc<Configuration>,
    ) -> ApplicationResult<Arc<Configuration>> {
        check_confirmed(self.name(), &self.options)?;
        require_migration_root(self.fs.as_ref(), config)
    }

    async fn execute(&self, config: Arc<Configuration>) -> ApplicationResult<Vec<String>> {
        let journal = JournalService::new(self.fs.clone(), &config.migration_root);
        revert_executed(&journal, Some(1))
    }

    async fn dispose(&self, reverted: Vec<String>) -> ApplicationResult<()> {
        report_reverted(self.reporter.as_ref(), &reverted);
        Ok(())
    }
}
