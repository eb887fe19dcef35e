//! Test support: logging setup and recording boundary implementations

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::infrastructure::traits::{Editor, Reporter, Terminator};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "debug");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_test_writer()
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Reporter that keeps every message.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    infos: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, msg: &str) {
        if let Ok(mut infos) = self.infos.lock() {
            infos.push(msg.to_string());
        }
    }

    fn error(&self, msg: &str) {
        if let Ok(mut errors) = self.errors.lock() {
            errors.push(msg.to_string());
        }
    }
}

/// Terminator that records exit codes instead of exiting.
#[derive(Debug, Default)]
pub struct RecordingTerminator {
    codes: Mutex<Vec<i32>>,
}

impl RecordingTerminator {
    pub fn codes(&self) -> Vec<i32> {
        self.codes.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Terminator for RecordingTerminator {
    fn terminate(&self, code: i32) {
        if let Ok(mut codes) = self.codes.lock() {
            codes.push(code);
        }
    }
}

/// Editor that records opened paths.
#[derive(Debug, Default)]
pub struct RecordingEditor {
    opened: Mutex<Vec<PathBuf>>,
}

impl RecordingEditor {
    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Editor for RecordingEditor {
    fn open(&self, path: &Path) -> io::Result<()> {
        if let Ok(mut opened) = self.opened.lock() {
            opened.push(path.to_path_buf());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
    }
}
