//! `mite audit`: find inconsistencies between the journal and the migration files

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::command::Command;
use crate::application::commands::require_migration_root;
use crate::application::services::JournalService;
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Configuration;
use crate::infrastructure::traits::{FileSystem, Reporter};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// Executed migrations whose file is gone
    pub missing: Vec<String>,
    /// Pending migrations older than the newest executed one
    pub out_of_order: Vec<String>,
}

impl AuditReport {
    pub fn problem_count(&self) -> usize {
        self.missing.len() + self.out_of_order.len()
    }
}

pub struct AuditCommand {
    fs: Arc<dyn FileSystem>,
    reporter: Arc<dyn Reporter>,
}

impl AuditCommand {
    pub fn new(fs: Arc<dyn FileSystem>, reporter: Arc<dyn Reporter>) -> Self {
        Self { fs, reporter }
    }
}

#[async_trait]
impl Command for AuditCommand {
    type Input = Arc<Configuration>;
    type Output = AuditReport;

    fn name(&self) -> &'static str {
        "audit"
    }

    async fn pre_execute(
        &self,
        config: Arc<Configuration>,
    ) -> ApplicationResult<Arc<Configuration>> {
        require_migration_root(self.fs.as_ref(), config)
    }

    async fn execute(&self, config: Arc<Configuration>) -> ApplicationResult<AuditReport> {
        let plan = JournalService::new(self.fs.clone(), &config.migration_root).plan()?;
        Ok(AuditReport {
            missing: plan.missing().iter().map(|e| e.id.clone()).collect(),
            out_of_order: plan.out_of_order().iter().map(|m| m.id.clone()).collect(),
        })
    }

    /// Report findings; any finding fails the invocation.
    async fn dispose(&self, report: AuditReport) -> ApplicationResult<()> {
        for id in &report.missing {
            self.reporter
                .info(&format!("missing file for executed migration {id}"));
        }
        for id in &report.out_of_order {
            self.reporter
                .info(&format!("pending migration {id} is older than the head"));
        }

        match report.problem_count() {
            0 => {
                self.reporter.info("no problems found");
                Ok(())
            }
            n => Err(ApplicationError::Command(format!(
                "audit found {n} problem(s)"
            ))),
        }
    }
}
