//! Application identifiers
//!
//! An application identifier names a project inside the build. Identifiers
//! are canonically lowercase, so a sub-project directory named `MyApp`
//! and one declared as `myapp` resolve to the same identifier. Any
//! directory name is a valid identifier as long as it is a single path
//! component.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AppIdError {
    #[error("Application identifier must not be empty")]
    Empty,

    #[error("Invalid application identifier '{0}': path separators and control characters are not allowed")]
    InvalidChars(String),

    #[error("Cannot derive an application identifier from path: {0}")]
    NoDirName(String),
}

/// Canonical (lowercase) application identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppId(String);

impl AppId {
    /// Creates an identifier, normalizing case
    pub fn new(name: &str) -> Result<Self, AppIdError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppIdError::Empty);
        }

        if name.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
            return Err(AppIdError::InvalidChars(name.to_string()));
        }

        Ok(Self(name.to_lowercase()))
    }

    /// Derives the identifier from the last component of a directory path
    pub fn from_dir(dir: &Path) -> Result<Self, AppIdError> {
        let name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppIdError::NoDirName(dir.display().to_string()))?;

        Self::new(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AppId {
    type Err = AppIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AppId {
    type Error = AppIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<AppId> for String {
    fn from(id: AppId) -> Self {
        id.0
    }
}
