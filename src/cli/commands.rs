//! Command dispatch: maps a parsed verb onto a command object and runs it

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::commands::{
    AuditCommand, CreateCommand, CreateOptions, DownCommand, DownOptions, InitCommand,
    StatusCommand, StepDownCommand, StepUpCommand, UpCommand,
};
use crate::application::RunOptions;
use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::exitcode;
use crate::infrastructure::di::ServiceContainer;

/// Message for an invocation without a verb.
pub const MISSING_COMMAND: &str = "empty/missing command";

/// Run the selected command and return its exit code.
///
/// # Errors
/// `CliError::Dispatch` when no verb was given; nothing has run in that case.
#[instrument(skip_all)]
pub async fn execute_command(cli: &Cli, services: &ServiceContainer) -> CliResult<i32> {
    let Some(command) = &cli.command else {
        return Err(CliError::Dispatch(MISSING_COMMAND.to_string()));
    };
    debug!(?command, "dispatching");

    let options = RunOptions::default().start_dir(cli.project_dir.clone());
    let runner = services.runner();
    let fs = services.fs.clone();
    let reporter = services.reporter.clone();

    let code = match command {
        Commands::Init => {
            let cmd = InitCommand::new(fs, reporter);
            runner.run(&cmd, &options.require_config(false)).await
        }
        Commands::Create { open } => {
            let cmd = CreateCommand::new(
                fs,
                services.editor.clone(),
                reporter,
                CreateOptions { open: *open },
            );
            runner.run(&cmd, &options).await
        }
        Commands::Status => runner.run(&StatusCommand::new(fs, reporter), &options).await,
        Commands::Up => runner.run(&UpCommand::new(fs, reporter), &options).await,
        Commands::Stepup => runner.run(&StepUpCommand::new(fs, reporter), &options).await,
        Commands::Down { confirm } => {
            let cmd = DownCommand::new(fs, reporter, DownOptions { confirmed: *confirm });
            runner.run(&cmd, &options).await
        }
        Commands::Stepdown { confirm } => {
            let cmd = StepDownCommand::new(fs, reporter, DownOptions { confirmed: *confirm });
            runner.run(&cmd, &options).await
        }
        Commands::Audit => runner.run(&AuditCommand::new(fs, reporter), &options).await,
        Commands::Completion { shell } => {
            print_completions(*shell);
            exitcode::OK
        }
    };
    Ok(code)
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
