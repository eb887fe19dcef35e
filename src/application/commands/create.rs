//! `mite create`: add an empty migration file

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::application::command::Command;
use crate::application::commands::require_migration_root;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Configuration;
use crate::domain::{DomainError, Migration};
use crate::infrastructure::traits::{Editor, FileSystem, Reporter};

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Open the new migration in the editor
    pub open: bool,
}

pub struct CreateCommand {
    fs: Arc<dyn FileSystem>,
    editor: Arc<dyn Editor>,
    reporter: Arc<dyn Reporter>,
    options: CreateOptions,
}

impl CreateCommand {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        editor: Arc<dyn Editor>,
        reporter: Arc<dyn Reporter>,
        options: CreateOptions,
    ) -> Self {
        Self {
            fs,
            editor,
            reporter,
            options,
        }
    }
}

#[async_trait]
impl Command for CreateCommand {
    type Input = Arc<Configuration>;
    type Output = Migration;

    fn name(&self) -> &'static str {
        "create"
    }

    async fn pre_execute(
        &self,
        config: Arc<Configuration>,
    ) -> ApplicationResult<Arc<Configuration>> {
        require_migration_root(self.fs.as_ref(), config)
    }

    async fn execute(&self, config: Arc<Configuration>) -> ApplicationResult<Migration> {
        let id = Migration::id_for(Utc::now());
        let path = config.migration_root.join(Migration::filename(&id));
        if self.fs.exists(&path) {
            return Err(DomainError::MigrationExists(id).into());
        }

        self.fs
            .write(&path, "")
            .with_path_context("create migration", &path)?;
        self.reporter.info(&format!("created {}", path.display()));

        if self.options.open {
            let editor = self.editor.clone();
            let target = path.clone();
            tokio::task::spawn_blocking(move || editor.open(&target))
                .await
                .map_err(|e| ApplicationError::OperationFailed {
                    context: "wait for editor".to_string(),
                    source: Box::new(e),
                })?
                .with_path_context("open editor", &path)?;
        }

        Ok(Migration { id, path })
    }
}
