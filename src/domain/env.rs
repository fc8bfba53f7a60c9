//! Build environments
//!
//! The build environment (`dev`, `test`, `prod`, ...) selects which
//! `[project.env.<name>]` overlay applies when a project is pushed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variable that selects the build environment
pub const ENV_VAR: &str = "MIX_ENV";

/// Name of a build environment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildEnv(String);

impl BuildEnv {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    /// Reads the environment from `MIX_ENV`, if set and non-empty
    pub fn from_process_env() -> Option<Self> {
        std::env::var(ENV_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BuildEnv {
    fn default() -> Self {
        Self("dev".to_string())
    }
}

impl fmt::Display for BuildEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
