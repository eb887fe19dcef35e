//! Command capability shared by every mite command

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ApplicationResult;
use crate::config::Configuration;

/// Lifecycle stage of one invocation, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolveRoot,
    LoadConfig,
    PreExecute,
    Execute,
    Dispose,
}

impl Stage {
    /// Stages implemented by the command object rather than the runner.
    pub fn is_command_stage(self) -> bool {
        matches!(self, Stage::PreExecute | Stage::Execute | Stage::Dispose)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ResolveRoot => "resolve-root",
            Stage::LoadConfig => "load-config",
            Stage::PreExecute => "pre-execute",
            Stage::Execute => "execute",
            Stage::Dispose => "dispose",
        };
        f.write_str(name)
    }
}

/// A command driven through the runner lifecycle.
///
/// Only `execute` is required. Without a `pre_execute` override the loaded
/// configuration is handed to `execute` unchanged, which is why `Input` must be
/// constructible from it. `dispose` defaults to a no-op.
#[async_trait]
pub trait Command: Send + Sync {
    type Input: From<Arc<Configuration>> + Send + 'static;
    type Output: Send + 'static;

    /// Verb the command is registered under.
    fn name(&self) -> &'static str;

    async fn pre_execute(&self, config: Arc<Configuration>) -> ApplicationResult<Self::Input> {
        Ok(Self::Input::from(config))
    }

    async fn execute(&self, input: Self::Input) -> ApplicationResult<Self::Output>;

    async fn dispose(&self, _output: Self::Output) -> ApplicationResult<()> {
        Ok(())
    }
}
