//! Project declarations
//!
//! A [`Project`] is the result of evaluating a declaration file. It is
//! shared behind an `Arc`; two handles denote the same loaded project iff
//! they point at the same allocation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use toml::Table;

use super::app_id::AppId;

/// A loaded project declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    /// Application declared by the project, if any
    app: Option<AppId>,

    /// Declaration file this project was evaluated from
    file: PathBuf,

    /// Declared configuration (before defaults and env overlay)
    declared: Table,
}

/// Shared handle to a loaded project
pub type ProjectRef = Arc<Project>;

impl Project {
    pub fn new(app: Option<AppId>, file: impl Into<PathBuf>, declared: Table) -> Self {
        Self {
            app,
            file: file.into(),
            declared,
        }
    }

    pub fn app(&self) -> Option<&AppId> {
        self.app.as_ref()
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Directory containing the declaration file
    pub fn dir(&self) -> &Path {
        self.file.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn declared(&self) -> &Table {
        &self.declared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_is_file_parent() {
        let p = Project::new(None, "/work/core/mix.toml", Table::new());
        assert_eq!(p.dir(), Path::new("/work/core"));
    }
}
