//! `mite status`: list migrations as executed or pending

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::command::Command;
use crate::application::commands::require_migration_root;
use crate::application::services::JournalService;
use crate::application::ApplicationResult;
use crate::config::Configuration;
use crate::infrastructure::traits::{FileSystem, Reporter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub id: String,
    pub executed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub migration_root: PathBuf,
    pub lines: Vec<StatusLine>,
}

impl StatusReport {
    pub fn pending_count(&self) -> usize {
        self.lines.iter().filter(|l| !l.executed).count()
    }
}

pub struct StatusCommand {
    fs: Arc<dyn FileSystem>,
    reporter: Arc<dyn Reporter>,
}

impl StatusCommand {
    pub fn new(fs: Arc<dyn FileSystem>, reporter: Arc<dyn Reporter>) -> Self {
        Self { fs, reporter }
    }
}

#[async_trait]
impl Command for StatusCommand {
    type Input = Arc<Configuration>;
    type Output = StatusReport;

    fn name(&self) -> &'static str {
        "status"
    }

    async fn pre_execute(
        &self,
        config: Arc<Configuration>,
    ) -> ApplicationResult<Arc<Configuration>> {
        require_migration_root(self.fs.as_ref(), config)
    }

    async fn execute(&self, config: Arc<Configuration>) -> ApplicationResult<StatusReport> {
        let plan = JournalService::new(self.fs.clone(), &config.migration_root).plan()?;
        let lines = plan
            .migrations
            .iter()
            .map(|m| StatusLine {
                id: m.id.clone(),
                executed: plan.is_executed(&m.id),
            })
            .collect();

        Ok(StatusReport {
            migration_root: config.migration_root.clone(),
            lines,
        })
    }

    async fn dispose(&self, report: StatusReport) -> ApplicationResult<()> {
        if report.lines.is_empty() {
            self.reporter.info(&format!(
                "no migrations in {}",
                report.migration_root.display()
            ));
            return Ok(());
        }

        for line in &report.lines {
            let state = if line.executed { "executed" } else { "pending" };
            self.reporter.info(&format!("{state:<9} {}", line.id));
        }
        self.reporter.info(&format!(
            "{} executed, {} pending",
            report.lines.len() - report.pending_count(),
            report.pending_count()
        ));
        Ok(())
    }
}
