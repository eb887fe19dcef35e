//! Command runner: drives one command through the fixed lifecycle
//!
//! resolve root → load config → pre_execute → execute → dispose
//!
//! Every stage is awaited before the next begins. A stage that returns an
//! error and a stage that panics end up on the same failure path: one
//! `fatal:` report, then exit code 1. The process is terminated exactly once.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, instrument};

use crate::application::command::{Command, Stage};
use crate::application::services::RootResolver;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Configuration;
use crate::exitcode;
use crate::infrastructure::traits::{FileSystem, Reporter, Terminator};

/// Per-invocation runner options.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Fail with "not a mite project" when no config marker is found
    pub require_config: bool,
    /// Directory root discovery starts from (default: cwd)
    pub start_dir: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            require_config: true,
            start_dir: None,
        }
    }
}

impl RunOptions {
    pub fn require_config(mut self, require_config: bool) -> Self {
        self.require_config = require_config;
        self
    }

    pub fn start_dir(mut self, start_dir: Option<PathBuf>) -> Self {
        self.start_dir = start_dir;
        self
    }
}

/// Scoped ownership of process termination.
///
/// The guard terminates with its recorded code when released, or when dropped
/// on any other path. Termination happens at most once.
pub struct ExitGuard {
    terminator: Arc<dyn Terminator>,
    code: i32,
    released: bool,
}

impl ExitGuard {
    /// Acquire the process; the code stays FAILURE until `succeed` is called.
    pub fn acquire(terminator: Arc<dyn Terminator>) -> Self {
        Self {
            terminator,
            code: exitcode::FAILURE,
            released: false,
        }
    }

    pub fn succeed(&mut self) {
        self.code = exitcode::OK;
    }

    /// Terminate now and return the code used.
    pub fn release(mut self) -> i32 {
        let code = self.code;
        self.terminate();
        code
    }

    fn terminate(&mut self) {
        if !self.released {
            self.released = true;
            self.terminator.terminate(self.code);
        }
    }
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Runs commands against the boundary implementations it was built with.
pub struct Runner {
    fs: Arc<dyn FileSystem>,
    reporter: Arc<dyn Reporter>,
    terminator: Arc<dyn Terminator>,
}

impl Runner {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        reporter: Arc<dyn Reporter>,
        terminator: Arc<dyn Terminator>,
    ) -> Self {
        Self {
            fs,
            reporter,
            terminator,
        }
    }

    /// Run a command through the full lifecycle and terminate.
    ///
    /// Returns the exit code passed to the terminator. With the real
    /// process terminator this function does not return.
    #[instrument(skip_all, fields(command = command.name()))]
    pub async fn run<C: Command>(&self, command: &C, options: &RunOptions) -> i32 {
        let mut guard = ExitGuard::acquire(self.terminator.clone());

        match self.lifecycle(command, options).await {
            Ok(()) => {
                debug!("command completed");
                guard.succeed();
            }
            Err(e) => {
                debug!(error = ?e, "command failed");
                self.reporter.error(&format!("fatal: {e}"));
            }
        }

        guard.release()
    }

    async fn lifecycle<C: Command>(
        &self,
        command: &C,
        options: &RunOptions,
    ) -> ApplicationResult<()> {
        let start_dir = match &options.start_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()
                .with_path_context("read current directory", Path::new("."))?,
        };

        let resolver = RootResolver::new(self.fs.clone());
        let root = stage(Stage::ResolveRoot, async {
            resolver.resolve(&start_dir, options.require_config)
        })
        .await?;

        let fallback_dir = self
            .fs
            .canonicalize(&start_dir)
            .unwrap_or_else(|_| start_dir.clone());
        let config = stage(Stage::LoadConfig, async {
            Configuration::load_from(self.fs.as_ref(), root.as_deref(), &fallback_dir)
        })
        .await?;
        let config = Arc::new(config);

        let input = stage(Stage::PreExecute, async move { command.pre_execute(config).await }).await?;
        let output = stage(Stage::Execute, async move { command.execute(input).await }).await?;
        stage(Stage::Dispose, async move { command.dispose(output).await }).await
    }
}

/// Send panic messages to the log instead of stderr.
///
/// A stage that panics is then reported once, by the runner's `fatal:` line,
/// exactly like a stage that returns an error. Process-wide; call once at startup.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        debug!(panic = %info, "stage panicked");
    }));
}

/// Await one stage, folding panics into the same error channel as returned errors.
async fn stage<T, F>(stage: Stage, fut: F) -> ApplicationResult<T>
where
    F: Future<Output = ApplicationResult<T>>,
{
    debug!(%stage, "entering stage");
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result.map_err(|e| e.in_stage(stage)),
        Err(payload) => Err(ApplicationError::CommandStage {
            stage,
            message: panic_message(payload),
        }),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
