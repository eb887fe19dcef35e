//! End-to-end command flows through the dispatcher, with recording doubles.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use rstest::rstest;
use tempfile::TempDir;

use mite::application::services::JOURNAL_FILENAME;
use mite::cli::args::Cli;
use mite::cli::commands::{execute_command, MISSING_COMMAND};
use mite::cli::CliError;
use mite::exitcode;
use mite::infrastructure::di::ServiceContainer;
use mite::infrastructure::traits::RealFileSystem;
use mite::util::testing::{
    init_test_setup, RecordingEditor, RecordingReporter, RecordingTerminator,
};

const FIRST: &str = "2024-01-01T00-00-00.000Z";
const SECOND: &str = "2024-02-01T00-00-00.000Z";

struct Project {
    dir: TempDir,
    reporter: Arc<RecordingReporter>,
    editor: Arc<RecordingEditor>,
    services: ServiceContainer,
}

impl Project {
    fn new() -> Self {
        init_test_setup();
        let dir = TempDir::new().unwrap();
        let reporter = Arc::new(RecordingReporter::default());
        let editor = Arc::new(RecordingEditor::default());
        let services = ServiceContainer::with_deps(
            Arc::new(RealFileSystem),
            editor.clone(),
            reporter.clone(),
            Arc::new(RecordingTerminator::default()),
        );
        Self {
            dir,
            reporter,
            editor,
            services,
        }
    }

    /// Initialized project with two migration files on disk.
    fn with_migrations() -> Self {
        let project = Self::new();
        fs::write(project.dir.path().join(".mite"), "{}").unwrap();
        fs::create_dir_all(project.migrations()).unwrap();
        for id in [SECOND, FIRST] {
            fs::write(project.migrations().join(format!("{id}.sql")), "").unwrap();
        }
        project
    }

    fn root(&self) -> PathBuf {
        fs::canonicalize(self.dir.path()).unwrap()
    }

    fn migrations(&self) -> PathBuf {
        self.dir.path().join("migrations")
    }

    async fn run(&self, args: &[&str]) -> Result<i32, CliError> {
        let project_dir = self.dir.path().to_string_lossy().into_owned();
        let mut argv = vec!["mite", "--project-dir", project_dir.as_str()];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).expect("valid arguments");
        execute_command(&cli, &self.services).await
    }

    fn journal(&self) -> String {
        fs::read_to_string(self.migrations().join(JOURNAL_FILENAME)).unwrap_or_default()
    }
}

fn sql_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".sql"))
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn given_empty_dir_when_init_then_writes_config_and_migration_dir() {
    let project = Project::new();

    let code = project.run(&["init"]).await.unwrap();

    assert_eq!(code, exitcode::OK);
    let config = fs::read_to_string(project.dir.path().join(".mite")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&config).unwrap();
    assert_eq!(parsed["migrationFolderName"], "migrations");
    assert!(project.migrations().is_dir());
    assert_eq!(
        project.reporter.infos(),
        vec![
            format!("created {}", project.root().join(".mite").display()),
            format!("created {}", project.root().join("migrations").display()),
        ]
    );
}

#[tokio::test]
async fn given_initialized_project_when_init_again_then_keeps_config() {
    let project = Project::new();
    fs::write(
        project.dir.path().join("mite.config"),
        r#"{"migrationFolderName": "sql"}"#,
    )
    .unwrap();

    let code = project.run(&["init"]).await.unwrap();

    assert_eq!(code, exitcode::OK);
    assert!(!project.dir.path().join(".mite").exists());
    assert!(project.dir.path().join("sql").is_dir());
    assert_eq!(
        project.reporter.infos()[0],
        format!(
            "config already exists: {}",
            project.root().join("mite.config").display()
        )
    );
}

#[rstest]
#[case::plain(&["create"], false)]
#[case::open(&["create", "--open"], true)]
#[tokio::test]
async fn given_project_when_create_then_empty_migration_written(
    #[case] args: &[&str],
    #[case] opened: bool,
) {
    let project = Project::new();
    fs::write(project.dir.path().join(".mite"), "{}").unwrap();
    fs::create_dir_all(project.migrations()).unwrap();

    let code = project.run(args).await.unwrap();

    assert_eq!(code, exitcode::OK);
    let files = sql_files(&project.migrations());
    assert_eq!(files.len(), 1);
    let created = project.root().join("migrations").join(&files[0]);
    assert_eq!(fs::read_to_string(&created).unwrap(), "");
    assert_eq!(
        project.reporter.infos(),
        vec![format!("created {}", created.display())]
    );
    let expected: Vec<PathBuf> = if opened { vec![created] } else { vec![] };
    assert_eq!(project.editor.opened(), expected);
}

#[tokio::test]
async fn given_project_without_migration_dir_when_create_then_fails() {
    let project = Project::new();
    fs::write(project.dir.path().join(".mite"), "{}").unwrap();

    let code = project.run(&["create"]).await.unwrap();

    assert_eq!(code, exitcode::FAILURE);
    let errors = project.reporter.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("fatal: migration directory not found:"));
}

#[tokio::test]
async fn given_pending_migrations_when_status_then_lists_each() {
    let project = Project::with_migrations();

    let code = project.run(&["status"]).await.unwrap();

    assert_eq!(code, exitcode::OK);
    assert_eq!(
        project.reporter.infos(),
        vec![
            format!("pending   {FIRST}"),
            format!("pending   {SECOND}"),
            "0 executed, 2 pending".to_string(),
        ]
    );
}

#[tokio::test]
async fn given_pending_migrations_when_stepup_then_up_then_all_executed_in_order() {
    let project = Project::with_migrations();

    assert_eq!(project.run(&["stepup"]).await.unwrap(), exitcode::OK);
    assert_eq!(project.run(&["up"]).await.unwrap(), exitcode::OK);
    assert_eq!(project.run(&["up"]).await.unwrap(), exitcode::OK);

    assert_eq!(
        project.reporter.infos(),
        vec![
            format!("executed {FIRST}"),
            format!("executed {SECOND}"),
            "already up to date".to_string(),
        ]
    );
    let journal = project.journal();
    assert!(journal.find(FIRST).unwrap() < journal.find(SECOND).unwrap());
}

#[rstest]
#[case::down("down")]
#[case::stepdown("stepdown")]
#[tokio::test]
async fn given_no_confirm_when_reverting_then_refuses(#[case] verb: &str) {
    let project = Project::with_migrations();
    project.run(&["up"]).await.unwrap();

    let code = project.run(&[verb]).await.unwrap();

    assert_eq!(code, exitcode::FAILURE);
    assert_eq!(
        project.reporter.errors(),
        vec![format!(
            "fatal: {verb} is a potentially dangerous operation; rerun with --confirm"
        )]
    );
    assert!(project.journal().contains(SECOND));
}

#[tokio::test]
async fn given_executed_migrations_when_stepdown_then_down_then_reverts_newest_first() {
    let project = Project::with_migrations();
    project.run(&["up"]).await.unwrap();

    assert_eq!(project.run(&["stepdown", "-C"]).await.unwrap(), exitcode::OK);
    assert!(!project.journal().contains(SECOND));
    assert!(project.journal().contains(FIRST));

    assert_eq!(project.run(&["down", "--confirm"]).await.unwrap(), exitcode::OK);
    assert_eq!(project.run(&["down", "-C"]).await.unwrap(), exitcode::OK);

    let infos = project.reporter.infos();
    assert_eq!(
        &infos[infos.len() - 3..],
        &[
            format!("reverted {SECOND}"),
            format!("reverted {FIRST}"),
            "nothing to revert".to_string(),
        ]
    );
}

#[tokio::test]
async fn given_consistent_project_when_audit_then_no_problems() {
    let project = Project::with_migrations();
    project.run(&["up"]).await.unwrap();

    let code = project.run(&["audit"]).await.unwrap();

    assert_eq!(code, exitcode::OK);
    assert_eq!(project.reporter.infos().last().unwrap(), "no problems found");
}

#[tokio::test]
async fn given_inconsistent_project_when_audit_then_reports_and_fails() {
    let project = Project::with_migrations();
    project.run(&["up"]).await.unwrap();
    let older = "2023-12-01T00-00-00.000Z";
    fs::write(project.migrations().join(format!("{older}.sql")), "").unwrap();
    fs::remove_file(project.migrations().join(format!("{FIRST}.sql"))).unwrap();

    let code = project.run(&["audit"]).await.unwrap();

    assert_eq!(code, exitcode::FAILURE);
    let infos = project.reporter.infos();
    assert!(infos.contains(&format!("missing file for executed migration {FIRST}")));
    assert!(infos.contains(&format!("pending migration {older} is older than the head")));
    assert_eq!(
        project.reporter.errors(),
        vec!["fatal: audit found 2 problem(s)"]
    );
}

#[tokio::test]
async fn given_no_verb_when_dispatched_then_missing_command() {
    let project = Project::new();

    let err = project.run(&[]).await.unwrap_err();

    assert!(matches!(err, CliError::Dispatch(_)));
    assert_eq!(err.to_string(), MISSING_COMMAND);
    assert!(err.wants_usage());
    assert_eq!(err.exit_code(), exitcode::FAILURE);
}

#[tokio::test]
async fn given_completion_verb_when_dispatched_then_bypasses_runner() {
    let project = Project::new();

    let code = project.run(&["completion", "bash"]).await.unwrap();

    assert_eq!(code, exitcode::OK);
    assert!(project.reporter.errors().is_empty());
    assert!(!project.dir.path().join(".mite").exists());
}
