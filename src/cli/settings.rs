//! User settings for the command-line tool

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings read from `settings.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Render target used when `--target` is not given
    pub default_target: String,

    /// Directory rendered files are written to when `--output` is relative
    pub output_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_target: "teamcity-kotlin".to_string(),
            output_dir: None,
        }
    }
}

impl Settings {
    /// Default location: `<config dir>/pipedef/settings.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pipedef").join("settings.yaml"))
    }

    /// Load settings from an explicit path, or from the default location
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("no settings file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Load settings from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings = Self::from_yaml(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        debug!(path = %path.display(), default_target = %settings.default_target, "loaded settings");
        Ok(settings)
    }

    /// Parse settings from YAML; an empty document yields defaults
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Where a rendered file should be written
    pub fn resolve_output(&self, output: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) if output.is_relative() => dir.join(output),
            _ => output.to_path_buf(),
        }
    }
}
