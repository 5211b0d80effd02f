//! Project config file reading utilities

use crate::error::{CliError, CliResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Location of the project config file, relative to the working directory
pub const PROJECT_CONFIG_PATH: &str = ".protopack/config.yaml";

/// Session defaults read from the project config file.
///
/// Every field is optional; command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub languages: Option<Vec<String>>,
    pub repo_dir: Option<PathBuf>,
    pub zip_url: Option<String>,
    pub google_api: Option<bool>,
    pub include_paths: Vec<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub templates: Option<PathBuf>,
    pub pkg_prefix: Option<String>,
    /// Language name to plugin executable
    pub plugins: BTreeMap<String, String>,
    pub alt_java: Option<bool>,
    pub compiler: Option<String>,
    pub override_config: Vec<PathBuf>,
}

/// Read the project config file from the working directory, or defaults if there is none.
pub fn read_project_config() -> CliResult<ProjectConfig> {
    read_project_config_from(Path::new(PROJECT_CONFIG_PATH))
}

/// Read a project config file, or defaults if it does not exist.
pub fn read_project_config_from(config_path: &Path) -> CliResult<ProjectConfig> {
    if !config_path.exists() {
        debug!(path = %config_path.display(), "No project config, using defaults");
        return Ok(ProjectConfig::default());
    }

    let config_content = fs::read_to_string(config_path)
        .map_err(|e| CliError::Message(format!("Failed to read config file: {e}")))?;
    if config_content.trim().is_empty() {
        return Ok(ProjectConfig::default());
    }

    let config = serde_yaml::from_str(&config_content)
        .map_err(|e| CliError::Message(format!("Failed to parse config file: {e}")))?;
    debug!(path = %config_path.display(), "Loaded project config");
    Ok(config)
}
