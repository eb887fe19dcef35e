//! Service container for dependency injection
//!
//! Wires the I/O boundary traits into the runner and the command objects.

use std::sync::Arc;

use crate::application::Runner;
use crate::infrastructure::traits::{
    Editor, EnvironmentEditor, FileSystem, ProcessTerminator, RealFileSystem, Reporter, Terminator,
};

/// Container holding the boundary implementations shared by one invocation.
pub struct ServiceContainer {
    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Editor used by `create --open`
    pub editor: Arc<dyn Editor>,

    /// Message sink for info and fatal output
    pub reporter: Arc<dyn Reporter>,

    /// Process termination
    pub terminator: Arc<dyn Terminator>,
}

impl ServiceContainer {
    /// Create a container with real implementations around the given reporter.
    pub fn new(reporter: Arc<dyn Reporter>) -> Self {
        Self::with_deps(
            Arc::new(RealFileSystem),
            Arc::new(EnvironmentEditor),
            reporter,
            Arc::new(ProcessTerminator),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        fs: Arc<dyn FileSystem>,
        editor: Arc<dyn Editor>,
        reporter: Arc<dyn Reporter>,
        terminator: Arc<dyn Terminator>,
    ) -> Self {
        Self {
            fs,
            editor,
            reporter,
            terminator,
        }
    }

    /// Runner bound to this container's filesystem, reporter and terminator.
    pub fn runner(&self) -> Runner {
        Runner::new(
            self.fs.clone(),
            self.reporter.clone(),
            self.terminator.clone(),
        )
    }
}
