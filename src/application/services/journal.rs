//! Migration journal service
//!
//! Keeps the record of executed migrations next to the migration files, in
//! `<migrationRoot>/.mite-journal.json`, and joins it with the files on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{JournalEntry, Migration, MigrationPlan};
use crate::infrastructure::traits::FileSystem;

/// Journal filename inside the migration directory.
pub const JOURNAL_FILENAME: &str = ".mite-journal.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct JournalDocument {
    executed: Vec<JournalEntry>,
}

/// Reads and updates the journal of one migration directory.
pub struct JournalService {
    fs: Arc<dyn FileSystem>,
    migration_root: PathBuf,
}

impl JournalService {
    pub fn new(fs: Arc<dyn FileSystem>, migration_root: &Path) -> Self {
        Self {
            fs,
            migration_root: migration_root.to_path_buf(),
        }
    }

    pub fn journal_path(&self) -> PathBuf {
        self.migration_root.join(JOURNAL_FILENAME)
    }

    /// Migration files on disk, sorted by id.
    pub fn migrations(&self) -> ApplicationResult<Vec<Migration>> {
        let names = self
            .fs
            .list_dir(&self.migration_root)
            .with_path_context("list migrations", &self.migration_root)?;
        let mut migrations: Vec<Migration> = names
            .iter()
            .filter_map(|name| Migration::from_path(&self.migration_root.join(name)))
            .collect();
        migrations.sort();
        Ok(migrations)
    }

    /// Executed migrations in execution order. A missing journal means none.
    pub fn executed(&self) -> ApplicationResult<Vec<JournalEntry>> {
        Ok(self.read()?.executed)
    }

    pub fn plan(&self) -> ApplicationResult<MigrationPlan> {
        Ok(MigrationPlan::new(self.migrations()?, self.executed()?))
    }

    /// Record a migration as executed.
    pub fn record_executed(&self, id: &str) -> ApplicationResult<JournalEntry> {
        let mut doc = self.read()?;
        if doc.executed.iter().any(|e| e.id == id) {
            return Err(ApplicationError::Command(format!(
                "migration already executed: {id}"
            )));
        }
        let entry = JournalEntry {
            id: id.to_string(),
            executed_at: Utc::now(),
        };
        doc.executed.push(entry.clone());
        self.write(&doc)?;
        debug!("recorded executed: {}", id);
        Ok(entry)
    }

    /// Remove a migration from the executed record.
    pub fn record_reverted(&self, id: &str) -> ApplicationResult<()> {
        let mut doc = self.read()?;
        let before = doc.executed.len();
        doc.executed.retain(|e| e.id != id);
        if doc.executed.len() == before {
            return Err(ApplicationError::Command(format!(
                "migration not executed: {id}"
            )));
        }
        self.write(&doc)?;
        debug!("recorded reverted: {}", id);
        Ok(())
    }

    fn read(&self) -> ApplicationResult<JournalDocument> {
        let path = self.journal_path();
        if !self.fs.exists(&path) {
            return Ok(JournalDocument::default());
        }
        let content = self
            .fs
            .read_to_string(&path)
            .with_path_context("read journal", &path)?;
        serde_json::from_str(&content).map_err(|e| ApplicationError::OperationFailed {
            context: format!("parse journal: {}", path.display()),
            source: Box::new(e),
        })
    }

    fn write(&self, doc: &JournalDocument) -> ApplicationResult<()> {
        let path = self.journal_path();
        let content =
            serde_json::to_string_pretty(doc).map_err(|e| ApplicationError::OperationFailed {
                context: format!("serialize journal: {}", path.display()),
                source: Box::new(e),
            })?;
        self.fs
            .write(&path, &(content + "\n"))
            .with_path_context("write journal", &path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::RealFileSystem;
    use tempfile::TempDir;

    fn service(dir: &Path) -> JournalService {
        JournalService::new(Arc::new(RealFileSystem), dir)
    }

    #[test]
    fn given_no_journal_when_executed_then_empty() {
        let temp = TempDir::new().unwrap();
        assert!(service(temp.path()).executed().unwrap().is_empty());
    }

    #[test]
    fn given_recorded_migrations_when_reverted_then_journal_updated() {
        let temp = TempDir::new().unwrap();
        let journal = service(temp.path());

        journal.record_executed("a").unwrap();
        journal.record_executed("b").unwrap();
        journal.record_reverted("a").unwrap();

        let ids: Vec<_> = journal.executed().unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn given_executed_migration_when_recorded_twice_then_fails() {
        let temp = TempDir::new().unwrap();
        let journal = service(temp.path());

        journal.record_executed("a").unwrap();
        assert!(journal.record_executed("a").is_err());
    }

    #[test]
    fn given_mixed_files_when_migrations_then_only_sql_sorted() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("b.sql"), "").unwrap();
        std::fs::write(temp.path().join("a.sql"), "").unwrap();
        std::fs::write(temp.path().join("README.md"), "").unwrap();
        let journal = service(temp.path());
        journal.record_executed("a").unwrap();

        let ids: Vec<_> = journal
            .migrations()
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
