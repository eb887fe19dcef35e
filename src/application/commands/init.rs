//! `mite init`: write the project config and create the migration directory

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::application::command::Command;
use crate::application::{ApplicationResult, IoResultExt};
use crate::config::Configuration;
use crate::infrastructure::traits::{FileSystem, Reporter};

/// What `init` changed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOutcome {
    pub config_path: PathBuf,
    pub created_config: bool,
    pub migration_root: PathBuf,
    pub created_migration_root: bool,
}

pub struct InitCommand {
    fs: Arc<dyn FileSystem>,
    reporter: Arc<dyn Reporter>,
}

impl InitCommand {
    pub fn new(fs: Arc<dyn FileSystem>, reporter: Arc<dyn Reporter>) -> Self {
        Self { fs, reporter }
    }
}

#[async_trait]
impl Command for InitCommand {
    type Input = Arc<Configuration>;
    type Output = InitOutcome;

    fn name(&self) -> &'static str {
        "init"
    }

    async fn execute(&self, config: Arc<Configuration>) -> ApplicationResult<InitOutcome> {
        let (config_path, created_config) = match &config.config_path {
            Some(existing) => (existing.clone(), false),
            None => {
                let path = config.default_config_path();
                self.fs
                    .write(&path, &Configuration::template()?)
                    .with_path_context("write config", &path)?;
                debug!("wrote config template: {}", path.display());
                (path, true)
            }
        };

        let migration_root = config.migration_root.clone();
        let created_migration_root = if self.fs.is_dir(&migration_root) {
            false
        } else {
            self.fs
                .create_dir_all(&migration_root)
                .with_path_context("create migration directory", &migration_root)?;
            true
        };

        Ok(InitOutcome {
            config_path,
            created_config,
            migration_root,
            created_migration_root,
        })
    }

    async fn dispose(&self, outcome: InitOutcome) -> ApplicationResult<()> {
        if outcome.created_config {
            self.reporter
                .info(&format!("created {}", outcome.config_path.display()));
        } else {
            self.reporter.info(&format!(
                "config already exists: {}",
                outcome.config_path.display()
            ));
        }
        if outcome.created_migration_root {
            self.reporter
                .info(&format!("created {}", outcome.migration_root.display()));
        }
        Ok(())
    }
}
