//! Tool settings
//!
//! Settings for `mixctx` itself live in `~/.config/mixctx/config.toml`
//! (platform equivalent via `directories`). Every key is optional.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::manifest::DECLARATION_FILE;
use crate::domain::BuildEnv;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to parse settings: {0}")]
    Parse(String),
}

/// User-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Build environment used when neither `--env` nor `MIX_ENV` is given
    pub env: Option<BuildEnv>,

    /// Name of the project declaration file
    pub declaration_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env: None,
            declaration_file: DECLARATION_FILE.to_string(),
        }
    }
}

impl Settings {
    /// Returns the settings directory
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "mixctx", "mixctx").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads settings from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::config_dir() {
            Some(dir) => Self::load_from(&dir.join("config.toml")),
            None => Ok(Self::default()),
        }
    }

    /// Loads settings from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;

        toml::from_str(&content)
            .map_err(|e| SettingsError::Parse(e.to_string()))
            .with_context(|| format!("Failed to load settings: {}", path.display()))
    }
}
