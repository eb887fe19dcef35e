//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing the runner
//! and commands to be tested with recording implementations.

use std::io;
use std::path::{Path, PathBuf};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Read raw file contents.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Names of the entries of a directory. Only names are returned, nothing is read.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>>;

    /// Canonicalize path (resolve symlinks, make absolute).
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Editor abstraction for opening files.
pub trait Editor: Send + Sync {
    /// Open a file in the editor.
    /// Blocks until editor exits.
    fn open(&self, path: &Path) -> io::Result<()>;
}

/// Sink for user-facing messages.
///
/// `error` goes to a channel distinct from normal output.
pub trait Reporter: Send + Sync {
    fn info(&self, msg: &str);
    fn error(&self, msg: &str);
}

/// Ends the process with an exit code.
pub trait Terminator: Send + Sync {
    fn terminate(&self, code: i32);
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }
}

/// Real editor implementation using $EDITOR, $VISUAL, or vim.
#[derive(Debug, Default)]
pub struct EnvironmentEditor;

impl Editor for EnvironmentEditor {
    fn open(&self, path: &Path) -> io::Result<()> {
        use std::process::Command;

        // Determine editor: $VISUAL > $EDITOR > vim
        let editor = std::env::var("VISUAL")
            .or_else(|_| std::env::var("EDITOR"))
            .unwrap_or_else(|_| "vim".to_string());

        let status = Command::new(&editor).arg(path).status()?;

        if status.success() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!("editor exited with status: {}", status),
            ))
        }
    }
}

/// Terminates the real process.
#[derive(Debug, Default)]
pub struct ProcessTerminator;

impl Terminator for ProcessTerminator {
    fn terminate(&self, code: i32) {
        use std::io::Write;

        std::io::stdout().flush().ok();
        std::io::stderr().flush().ok();
        std::process::exit(code);
    }
}
