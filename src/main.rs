use std::process;
use std::sync::Arc;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{CommandFactory, Parser};
use mite::application::install_panic_hook;
use mite::cli::args::Cli;
use mite::cli::commands::execute_command;
use mite::cli::output::{self, TerminalReporter};
use mite::cli::CliError;
use mite::exitcode;
use mite::infrastructure::di::ServiceContainer;
use mite::infrastructure::InfraError;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => usage_error(&invalid_command_message(&e)),
        },
    };

    setup_logging(cli.verbose);
    install_panic_hook();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            let err = CliError::from(InfraError::io("start async runtime", e));
            output::error(&err);
            process::exit(err.exit_code());
        }
    };

    let services = ServiceContainer::new(Arc::new(TerminalReporter));
    match runtime.block_on(execute_command(&cli, &services)) {
        Ok(code) => process::exit(code),
        Err(e) if e.wants_usage() => usage_error(&e.to_string()),
        Err(e) => {
            output::error(&e);
            process::exit(e.exit_code());
        }
    }
}

fn invalid_command_message(e: &clap::Error) -> String {
    let offending = [ContextKind::InvalidSubcommand, ContextKind::InvalidArg]
        .into_iter()
        .find_map(|kind| match e.get(kind) {
            Some(ContextValue::String(s)) => Some(s.clone()),
            _ => None,
        });
    match offending {
        Some(value) => format!("invalid command: '{}'", value),
        None => "invalid command".to_string(),
    }
}

/// Report a dispatch failure, print usage and exit 1.
fn usage_error(msg: &str) -> ! {
    output::error(&CliError::Dispatch(msg.to_string()));
    eprintln!();
    Cli::command().print_help().ok();
    process::exit(exitcode::FAILURE);
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        3 => LevelFilter::TRACE,
        _ => {
            eprintln!("Don't be crazy, max is -v -v -v");
            LevelFilter::TRACE
        }
    };

    // RUST_LOG wins when set
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();

    match level {
        LevelFilter::INFO => tracing::info!("Debug mode: info"),
        LevelFilter::DEBUG => tracing::debug!("Debug mode: debug"),
        LevelFilter::TRACE => tracing::debug!("Debug mode: trace"),
        _ => {}
    }
}
