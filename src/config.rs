//! Configuration loading with layered merging
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults: `defaults.json`
//! 2. Project config: first of `.mite`, `mite.config` present at the project root
//! 3. Environment variables: `MITE_*` prefix
//!
//! Merging is shallow: a key present in a higher layer replaces the whole value
//! of the lower layer. Unknown keys are kept and passed through to commands.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{config_filenames, current_platform, CONFIG_FILENAMES, DEFAULT_CONFIG_FILENAME};
use crate::infrastructure::traits::FileSystem;

const DEFAULTS_JSON: &str = include_str!("../defaults.json");

/// Key of the migration folder setting in config documents.
pub const MIGRATION_FOLDER_KEY: &str = "migrationFolderName";

/// Immutable configuration snapshot for one invocation.
///
/// Serializes as one flat object: the merged settings (which always carry
/// `migrationFolderName`) followed by the derived fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Merged settings: defaults overlaid by the config file and environment
    #[serde(flatten)]
    pub settings: Map<String, Value>,
    /// Name of the migration directory below the project root
    #[serde(skip)]
    pub migration_folder_name: String,
    /// `project_dir` joined with `migration_folder_name`
    pub migration_root: PathBuf,
    /// Whether a project config file was found and parsed
    pub config_exists: bool,
    /// Resolved project root, or `.` when none was found
    pub mite_root: PathBuf,
    /// Absolute directory the configuration was resolved against
    pub project_dir: PathBuf,
    /// Config file that was loaded, if any
    pub config_path: Option<PathBuf>,
    /// Recognized config filenames in priority order
    #[serde(rename = "recognizedConfigFilenames")]
    pub config_filenames: Vec<String>,
    /// Filename used when creating a new config file
    pub default_config_filename: String,
    /// Normalized OS identifier (`osx`, `windows`, `linux`, ...)
    pub platform: String,
}

impl Configuration {
    /// Load configuration for a project root; `fallback_dir` stands in when no root was found.
    ///
    /// A missing config file is not an error. A config file that is not a JSON
    /// object fails with `InvalidConfig` naming the file.
    pub fn load_from(
        fs: &dyn FileSystem,
        root: Option<&Path>,
        fallback_dir: &Path,
    ) -> ApplicationResult<Self> {
        let project_dir = root.unwrap_or(fallback_dir).to_path_buf();

        // 1. Start with defaults
        let mut settings = defaults()?;

        // 2. Overlay the first config file that exists
        let config_path = config_candidates(&project_dir)
            .into_iter()
            .find(|p| fs.exists(p));
        if let Some(path) = &config_path {
            debug!("loading config file: {}", path.display());
            let user = load_user_settings(fs, path)?;
            settings.extend(user);
        }

        // 3. Environment overrides
        apply_env_overrides(&mut settings)?;

        let migration_folder_name = match settings.get(MIGRATION_FOLDER_KEY) {
            Some(Value::String(name)) => name.clone(),
            Some(other) => {
                return Err(ApplicationError::Config {
                    message: format!("{MIGRATION_FOLDER_KEY} must be a string, got {other}"),
                })
            }
            None => {
                return Err(ApplicationError::Config {
                    message: format!("{MIGRATION_FOLDER_KEY} is not set"),
                })
            }
        };

        Ok(Self {
            migration_root: project_dir.join(&migration_folder_name),
            migration_folder_name,
            config_exists: config_path.is_some(),
            mite_root: root
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
            project_dir,
            config_path,
            config_filenames: config_filenames(),
            default_config_filename: DEFAULT_CONFIG_FILENAME.to_string(),
            platform: current_platform(),
            settings,
        })
    }

    /// Look up a merged setting by its config document key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    /// Path a new config file is written to.
    pub fn default_config_path(&self) -> PathBuf {
        self.project_dir.join(&self.default_config_filename)
    }

    /// Generate the content of a fresh config file (the compiled defaults).
    pub fn template() -> ApplicationResult<String> {
        let defaults = Value::Object(defaults()?);
        serde_json::to_string_pretty(&defaults)
            .map(|s| s + "\n")
            .map_err(|e| ApplicationError::Config {
                message: format!("serialize config template: {e}"),
            })
    }
}

/// Candidate config file paths in priority order.
pub fn config_candidates(root: &Path) -> Vec<PathBuf> {
    CONFIG_FILENAMES.iter().map(|name| root.join(name)).collect()
}

fn defaults() -> ApplicationResult<Map<String, Value>> {
    serde_json::from_str(DEFAULTS_JSON).map_err(|e| ApplicationError::Config {
        message: format!("parse compiled defaults: {e}"),
    })
}

fn load_user_settings(fs: &dyn FileSystem, path: &Path) -> ApplicationResult<Map<String, Value>> {
    // bytes, so that malformed UTF-8 is reported as invalid json
    let content = fs.read(path).with_path_context("read config", path)?;
    serde_json::from_slice(&content).map_err(|source| ApplicationError::InvalidConfig {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply MITE_* environment variables as explicit overrides.
fn apply_env_overrides(settings: &mut Map<String, Value>) -> ApplicationResult<()> {
    let config = Config::builder()
        .add_source(
            Environment::with_prefix("MITE")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .map_err(config_err)?;

    if let Ok(val) = config.get_string("migration_folder_name") {
        debug!("{MIGRATION_FOLDER_KEY} overridden from environment");
        settings.insert(MIGRATION_FOLDER_KEY.to_string(), Value::String(val));
    }

    Ok(())
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_compiled_defaults_when_parsed_then_has_migration_folder() {
        let defaults = defaults().expect("defaults parse");
        assert_eq!(
            defaults.get(MIGRATION_FOLDER_KEY),
            Some(&Value::String("migrations".into()))
        );
    }

    #[test]
    fn given_template_when_parsed_then_equals_defaults() {
        let template = Configuration::template().expect("template");
        let parsed: Map<String, Value> = serde_json::from_str(&template).expect("valid json");
        assert_eq!(parsed, defaults().unwrap());
    }

    #[test]
    fn given_root_when_candidates_then_follow_priority_order() {
        let candidates = config_candidates(Path::new("/project"));
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/project/.mite"),
                PathBuf::from("/project/mite.config")
            ]
        );
    }
}
