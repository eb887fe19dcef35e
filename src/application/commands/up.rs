//! `mite up` and `mite stepup`: execute pending migrations in id order

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::application::command::Command;
use crate::application::commands::require_migration_root;
use crate::application::services::JournalService;
use crate::application::ApplicationResult;
use crate::config::Configuration;
use crate::infrastructure::traits::{FileSystem, Reporter};

/// Execute up to `limit` pending migrations; all of them when `None`.
fn execute_pending(
    journal: &JournalService,
    limit: Option<usize>,
) -> ApplicationResult<Vec<String>> {
    let plan = journal.plan()?;
    let pending = plan.pending();
    let take = limit.unwrap_or(pending.len());

    let mut executed = Vec::new();
    for migration in pending.into_iter().take(take) {
        debug!("executing {}", migration.id);
        journal.record_executed(&migration.id)?;
        executed.push(migration.id.clone());
    }
    Ok(executed)
}

fn report_executed(reporter: &dyn Reporter, executed: &[String]) {
    if executed.is_empty() {
        reporter.info("already up to date");
    }
    for id in executed {
        reporter.info(&format!("executed {id}"));
    }
}

pub struct UpCommand {
    fs: Arc<dyn FileSystem>,
    reporter: Arc<dyn Reporter>,
}

impl UpCommand {
    pub fn new(fs: Arc<dyn FileSystem>, reporter: Arc<dyn Reporter>) -> Self {
        Self { fs, reporter }
    }
}

#[async_trait]
impl Command for UpCommand {
    type Input = Arc<Configuration>;
    type Output = Vec<String>;

    fn name(&self) -> &'static str {
        "up"
    }

    async fn pre_execute(
        &self,
        config: Arc<Configuration>,
    ) -> ApplicationResult<Arc<Configuration>> {
        require_migration_root(self.fs.as_ref(), config)
    }

    async fn execute(&self, config: Arc<Configuration>) -> ApplicationResult<Vec<String>> {
        let journal = JournalService::new(self.fs.clone(), &config.migration_root);
        execute_pending(&journal, None)
    }

    async fn dispose(&self, executed: Vec<String>) -> ApplicationResult<()> {
        report_executed(self.reporter.as_ref(), &executed);
        Ok(())
    }
}

pub struct StepUpCommand {
    fs: Arc<dyn FileSystem>,
    reporter: Arc<dyn Reporter>,
}

impl StepUpCommand {
    pub fn new(fs: Arc<dyn FileSystem>, reporter: Arc<dyn Reporter>) -> Self {
        Self { fs, reporter }
    }
}

#[async_trait]
impl Command for StepUpCommand {
    type Input = Arc<Configuration>;
    type Output = Vec<String>;

    fn name(&self) -> &'static str {
        "stepup"
    }

    async fn pre_execute(
        &self,
        config: Arc<Configuration>,
    ) -> ApplicationResult<Arc<Configuration>> {
        require_migration_root(self.fs.as_ref(), config)
    }

    async fn execute(&self, config: Arc<Configuration>) -> ApplicationResult<Vec<String>> {
        let journal = JournalService::new(self.fs.clone(), &config.migration_root);
        execute_pending(&journal, Some(1))
    }

    async fn dispose(&self, executed: Vec<String>) -> ApplicationResult<()> {
        report_executed(self.reporter.as_ref(), &executed);
        Ok(())
    }
}
