//! Domain entities: core data structures

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filenames that mark a directory as a mite project, in priority order.
pub const CONFIG_FILENAMES: [&str; 2] = [".mite", "mite.config"];

/// Filename written when a project is initialized.
pub const DEFAULT_CONFIG_FILENAME: &str = CONFIG_FILENAMES[0];

/// Extension of migration files inside the migration directory.
pub const MIGRATION_EXTENSION: &str = "sql";

/// Recognized config filenames as owned strings (for error messages and config metadata).
pub fn config_filenames() -> Vec<String> {
    CONFIG_FILENAMES.iter().map(|s| s.to_string()).collect()
}

/// Map a raw OS name onto the platform identifier exposed in configuration.
///
/// Names are lowercased first; `darwin`/`macos` become `osx` and
/// `windows_nt`/`windows` become `windows`. Anything else passes through.
/// The mapping is idempotent: normalizing an already normalized name is a no-op.
pub fn normalize_platform(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    match lowered.as_str() {
        "darwin" | "macos" => "osx".to_string(),
        "windows_nt" | "windows" => "windows".to_string(),
        _ => lowered,
    }
}

/// Platform identifier of the running process.
pub fn current_platform() -> String {
    normalize_platform(std::env::consts::OS)
}

/// A migration file on disk, identified by its file stem.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Migration {
    pub id: String,
    pub path: PathBuf,
}

impl Migration {
    /// Build a migration from a path, if it carries the migration extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        if path.extension()? != MIGRATION_EXTENSION {
            return None;
        }
        let id = path.file_stem()?.to_str()?.to_string();
        Some(Self {
            id,
            path: path.to_path_buf(),
        })
    }

    /// Migration id for a given creation instant, e.g. `2014-02-18T05-29-39.686Z`.
    ///
    /// Ids sort lexicographically in creation order.
    pub fn id_for(created_at: DateTime<Utc>) -> String {
        created_at.format("%Y-%m-%dT%H-%M-%S%.3fZ").to_string()
    }

    /// Filename for a migration id.
    pub fn filename(id: &str) -> String {
        format!("{id}.{MIGRATION_EXTENSION}")
    }
}

/// One executed migration as recorded in the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    pub executed_at: DateTime<Utc>,
}

/// Migrations on disk joined with the journal of executed ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationPlan {
    /// Migrations found on disk, sorted by id
    pub migrations: Vec<Migration>,
    /// Executed migrations in execution order
    pub executed: Vec<JournalEntry>,
}

impl MigrationPlan {
    pub fn new(mut migrations: Vec<Migration>, executed: Vec<JournalEntry>) -> Self {
        migrations.sort();
        Self {
            migrations,
            executed,
        }
    }

    pub fn is_executed(&self, id: &str) -> bool {
        self.executed.iter().any(|e| e.id == id)
    }

    /// Migrations on disk not yet executed, in id order.
    pub fn pending(&self) -> Vec<&Migration> {
        self.migrations
            .iter()
            .filter(|m| !self.is_executed(&m.id))
            .collect()
    }

    /// Most recently executed migration.
    pub fn head(&self) -> Option<&JournalEntry> {
        self.executed.last()
    }

    /// Journal entries whose migration file no longer exists.
    pub fn missing(&self) -> Vec<&JournalEntry> {
        self.executed
            .iter()
            .filter(|e| !self.migrations.iter().any(|m| m.id == e.id))
            .collect()
    }

    /// Pending migrations that sort before the newest executed one.
    pub fn out_of_order(&self) -> Vec<&Migration> {
        let Some(newest) = self.executed.iter().map(|e| e.id.as_str()).max() else {
            return Vec::new();
        };
        self.pending()
            .into_iter()
            .filter(|m| m.id.as_str() < newest)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn migration(id: &str) -> Migration {
        Migration {
            id: id.to_string(),
            path: PathBuf::from(format!("migrations/{id}.sql")),
        }
    }

    fn entry(id: &str) -> JournalEntry {
        JournalEntry {
            id: id.to_string(),
            executed_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[rstest]
    #[case("Darwin", "osx")]
    #[case("macos", "osx")]
    #[case("Windows_NT", "windows")]
    #[case("windows", "windows")]
    #[case("Linux", "linux")]
    #[case("freebsd", "freebsd")]
    fn given_raw_os_name_when_normalized_then_maps_to_platform(
        #[case] raw: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(normalize_platform(raw), expected);
    }

    #[rstest]
    #[case("Darwin")]
    #[case("Windows_NT")]
    #[case("linux")]
    #[case("SunOS")]
    fn given_normalized_platform_when_normalized_again_then_unchanged(#[case] raw: &str) {
        let once = normalize_platform(raw);
        assert_eq!(normalize_platform(&once), once);
    }

    #[test]
    fn given_sql_path_when_from_path_then_uses_stem_as_id() {
        let m = Migration::from_path(Path::new("/p/migrations/2024-01-01T00-00-00.000Z.sql"))
            .expect("sql file");
        assert_eq!(m.id, "2024-01-01T00-00-00.000Z");
    }

    #[test]
    fn given_other_extension_when_from_path_then_none() {
        assert!(Migration::from_path(Path::new("/p/migrations/notes.txt")).is_none());
        assert!(Migration::from_path(Path::new("/p/migrations/.mite-journal.json")).is_none());
    }

    #[test]
    fn given_instant_when_id_for_then_formats_filesystem_safe_timestamp() {
        let at = Utc
            .with_ymd_and_hms(2014, 2, 18, 5, 29, 39)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(686))
            .unwrap();
        assert_eq!(Migration::id_for(at), "2014-02-18T05-29-39.686Z");
    }

    #[test]
    fn given_partial_journal_when_pending_then_lists_unexecuted_in_order() {
        let plan = MigrationPlan::new(
            vec![migration("c"), migration("a"), migration("b")],
            vec![entry("a")],
        );
        let pending: Vec<_> = plan.pending().iter().map(|m| m.id.clone()).collect();
        assert_eq!(pending, vec!["b", "c"]);
        assert_eq!(plan.head().map(|e| e.id.as_str()), Some("a"));
    }

    #[test]
    fn given_gap_before_head_when_out_of_order_then_reports_skipped_migration() {
        let plan = MigrationPlan::new(
            vec![migration("a"), migration("b"), migration("c")],
            vec![entry("a"), entry("c")],
        );
        let skipped: Vec<_> = plan.out_of_order().iter().map(|m| m.id.clone()).collect();
        assert_eq!(skipped, vec!["b"]);
    }

    #[test]
    fn given_deleted_file_when_missing_then_reports_journal_entry() {
        let plan = MigrationPlan::new(vec![migration("a")], vec![entry("a"), entry("gone")]);
        let missing: Vec<_> = plan.missing().iter().map(|e| e.id.clone()).collect();
        assert_eq!(missing, vec!["gone"]);
    }
}
