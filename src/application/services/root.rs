//! Project root discovery
//!
//! Walks upward from a starting directory until a directory lists one of the
//! recognized config filenames. Only entry names are checked; no file is read.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{config_filenames, DomainError, CONFIG_FILENAMES};
use crate::infrastructure::traits::FileSystem;

/// Drive roots such as `C:\`.
const DRIVE_ROOT_PATTERN: &str = r"^[a-zA-Z1-9_]+:\\$";

/// Locates the mite project root.
pub struct RootResolver {
    fs: Arc<dyn FileSystem>,
}

impl RootResolver {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Find the nearest directory at or above `start_dir` holding a config marker.
    ///
    /// The walk stops below the filesystem root: a directory without a parent,
    /// or one matching a drive-root pattern, is never listed.
    ///
    /// # Returns
    /// `Some(root)` when found, `None` when not found and `require_config` is false.
    ///
    /// # Errors
    /// `NotAProject` when not found and `require_config` is true.
    pub fn resolve(
        &self,
        start_dir: &Path,
        require_config: bool,
    ) -> ApplicationResult<Option<PathBuf>> {
        let drive_root =
            Regex::new(DRIVE_ROOT_PATTERN).map_err(|e| ApplicationError::OperationFailed {
                context: "compile drive root pattern".to_string(),
                source: Box::new(e),
            })?;

        let mut dir = self
            .fs
            .canonicalize(start_dir)
            .with_path_context("resolve start directory", start_dir)?;
        let mut root = None;

        while !is_walk_boundary(&dir, &drive_root) {
            debug!("looking for config in {}", dir.display());
            let names = self
                .fs
                .list_dir(&dir)
                .with_path_context("list directory", &dir)?;

            if names.iter().any(|n| CONFIG_FILENAMES.contains(&n.as_str())) {
                root = Some(dir);
                break;
            }

            match dir.parent() {
                Some(parent) => dir = parent.to_path_buf(),
                None => break,
            }
        }

        match root {
            Some(root) => {
                debug!("project root: {}", root.display());
                Ok(Some(root))
            }
            None if require_config => Err(DomainError::NotAProject {
                filenames: config_filenames(),
            }
            .into()),
            None => Ok(None),
        }
    }
}

fn is_walk_boundary(dir: &Path, drive_root: &Regex) -> bool {
    match dir.parent() {
        None => true,
        Some(parent) => parent == dir || drive_root.is_match(&dir.to_string_lossy()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern() -> Regex {
        Regex::new(DRIVE_ROOT_PATTERN).unwrap()
    }

    #[test]
    fn given_unix_root_when_boundary_check_then_stops() {
        assert!(is_walk_boundary(Path::new("/"), &pattern()));
    }

    #[test]
    fn given_nested_dir_when_boundary_check_then_continues() {
        assert!(!is_walk_boundary(Path::new("/home/user/project"), &pattern()));
    }

    #[test]
    fn given_drive_root_string_when_matched_then_recognized() {
        assert!(pattern().is_match(r"C:\"));
        assert!(pattern().is_match(r"data_1:\"));
        assert!(!pattern().is_match(r"C:\projects"));
    }
}
