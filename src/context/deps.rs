//! Declared project dependencies
//!
//! Dependencies are listed under the `deps` key of a project's
//! configuration:
//!
//! ```toml
//! deps = [
//!     { app = "core", in_umbrella = true },
//!     { app = "util", path = "../../vendor/util" },
//!     { app = "json", version = "~> 1.0" },
//! ]
//! ```
//!
//! Only what umbrella ordering needs is modeled: the dependency's
//! application, where it lives and whether it is available.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use thiserror::Error;
use toml::Value;

use crate::domain::{AppId, ProjectConfig};

#[derive(Debug, Error, PartialEq)]
pub enum DepsError {
    #[error("'deps' must be an array, found {0}")]
    NotAnArray(String),

    #[error("Invalid dependency #{index}: {reason}")]
    Invalid { index: usize, reason: String },
}

/// A declared dependency
#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
    pub app: AppId,

    /// Location of the dependency, when it is a path dependency
    pub path: Option<PathBuf>,

    /// Version requirement, when fetched from elsewhere
    pub requirement: Option<String>,

    available: bool,
}

impl Dependency {
    pub fn new(app: AppId, path: Option<PathBuf>, requirement: Option<String>, available: bool) -> Self {
        Self {
            app,
            path,
            requirement,
            available,
        }
    }

    /// True if the dependency's sources are present
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// True if this is a path dependency living directly under `apps_root`
    pub fn in_umbrella(&self, apps_root: &Path) -> bool {
        let Some(path) = &self.path else {
            return false;
        };

        let path = path.canonicalize().unwrap_or_else(|_| path.clone());
        let root = apps_root
            .canonicalize()
            .unwrap_or_else(|_| apps_root.to_path_buf());

        path.parent() == Some(root.as_path())
    }
}

/// Lists the dependencies of a loaded project
pub trait DependencySource {
    fn dependencies(&self, config: &ProjectConfig, project_dir: &Path) -> Result<Vec<Dependency>>;
}

/// Reads dependencies from the `deps` configuration key
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredDeps;

impl DependencySource for DeclaredDeps {
    fn dependencies(&self, config: &ProjectConfig, project_dir: &Path) -> Result<Vec<Dependency>> {
        let entries = match config.get("deps") {
            None => return Ok(vec![]),
            Some(Value::Array(items)) => items,
            Some(other) => return Err(DepsError::NotAnArray(other.type_str().to_string()).into()),
        };

        let deps_path = project_dir.join(config.deps_path().unwrap_or("deps"));

        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| parse_entry(index, entry, project_dir, &deps_path))
            .collect::<Result<Vec<_>, DepsError>>()
            .map_err(Into::into)
    }
}

fn parse_entry(
    index: usize,
    entry: &Value,
    project_dir: &Path,
    deps_path: &Path,
) -> Result<Dependency, DepsError> {
    let invalid = |reason: String| DepsError::Invalid { index, reason };

    let (name, table) = match entry {
        Value::String(name) => (name.as_str(), None),
        Value::Table(t) => {
            let name = t
                .get("app")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid("missing 'app' name".to_string()))?;
            (name, Some(t))
        }
        other => return Err(invalid(format!("expected a table, found {}", other.type_str()))),
    };

    let app = AppId::new(name).map_err(|e| invalid(e.to_string()))?;

    let in_umbrella = table
        .and_then(|t| t.get("in_umbrella"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let path = match table.and_then(|t| t.get("path")).and_then(Value::as_str) {
        Some(p) => Some(project_dir.join(p)),
        None if in_umbrella => Some(sibling_dir(project_dir, &app)),
        None => None,
    };

    let requirement = table
        .and_then(|t| t.get("version"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let available = match &path {
        Some(p) => p.is_dir(),
        None => deps_path.join(app.as_str()).is_dir(),
    };

    Ok(Dependency::new(app, path, requirement, available))
}

/// Directory next to `project_dir` whose name normalizes to `app`
///
/// Falls back to `../<app>` when no such directory exists.
fn sibling_dir(project_dir: &Path, app: &AppId) -> PathBuf {
    let fallback = project_dir.join("..").join(app.as_str());
    if fallback.is_dir() {
        return fallback;
    }

    let Some(entries) = project_dir.parent().and_then(|p| fs::read_dir(p).ok()) else {
        return fallback;
    };

    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| path.is_dir() && AppId::from_dir(path).is_ok_and(|id| id == *app))
        .unwrap_or(fallback)
}
