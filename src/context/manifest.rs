//! Project declaration files
//!
//! A declaration file (`mix.toml` by default) is a TOML document whose
//! `[project]` table is the project's declared configuration:
//!
//! ```toml
//! [project]
//! app = "web"
//! compile_path = "ebin"
//! deps = [{ app = "core", in_umbrella = true }]
//!
//! [project.env.test]
//! compile_path = "test_ebin"
//! ```
//!
//! A file without a `[project]` table declares no project.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml::{Table, Value};

use super::loader::DeclarationLoader;
use crate::domain::{AppId, Project};

/// Conventional name of the declaration file
pub const DECLARATION_FILE: &str = "mix.toml";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read project declaration {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse project declaration {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid project declaration {}: {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Evaluates TOML declaration files
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    file_name: String,
}

impl Default for ManifestLoader {
    fn default() -> Self {
        Self::new(DECLARATION_FILE)
    }
}

impl ManifestLoader {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    /// Parses a declaration from its text
    pub fn parse(path: &Path, content: &str) -> Result<Option<Project>, ManifestError> {
        let doc: Table = content.parse().map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let declared = match doc.get("project") {
            None => return Ok(None),
            Some(Value::Table(t)) => t.clone(),
            Some(other) => {
                return Err(ManifestError::Invalid {
                    path: path.to_path_buf(),
                    reason: format!("'project' must be a table, found {}", other.type_str()),
                })
            }
        };

        let app = match declared.get("app") {
            None => None,
            Some(Value::String(name)) => {
                Some(AppId::new(name).map_err(|e| ManifestError::Invalid {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?)
            }
            Some(other) => {
                return Err(ManifestError::Invalid {
                    path: path.to_path_buf(),
                    reason: format!("'app' must be a string, found {}", other.type_str()),
                })
            }
        };

        Ok(Some(Project::new(app, path, declared)))
    }
}

impl DeclarationLoader for ManifestLoader {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn evaluate(&self, file: &Path) -> anyhow::Result<Option<Project>> {
        let content = fs::read_to_string(file).map_err(|source| ManifestError::Read {
            path: file.to_path_buf(),
            source,
        })?;

        Ok(Self::parse(file, &content)?)
    }
}
