//! Project loading
//!
//! [`Loader`] turns an application identifier into an active project:
//! it evaluates the declaration file in a directory (once per
//! application, later loads hit the stack's cache) and pushes the
//! resulting frame. A directory without a usable declaration pushes the
//! defaults placeholder instead, so every successful load adds exactly
//! one frame.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use toml::Table;

use super::cwd::WorkingDir;
use super::manifest::ManifestLoader;
use super::stack::{CachedProject, ProjectScope, ProjectStack};
use crate::domain::{AppId, Project, ProjectConfig, ProjectRef};

/// Evaluates project declaration files
pub trait DeclarationLoader {
    /// File name looked up in a project directory
    fn file_name(&self) -> &str;

    /// Evaluates `file`, returning `None` if it declares no project
    fn evaluate(&self, file: &Path) -> Result<Option<Project>>;
}

/// Loads projects onto a [`ProjectStack`]
#[derive(Debug)]
pub struct Loader<'s, D = ManifestLoader> {
    stack: &'s ProjectStack,
    declarations: D,
}

impl<'s> Loader<'s> {
    /// Loader reading `mix.toml` declarations
    pub fn with_manifests(stack: &'s ProjectStack) -> Self {
        Self::new(stack, ManifestLoader::default())
    }
}

impl<'s, D: DeclarationLoader> Loader<'s, D> {
    pub fn new(stack: &'s ProjectStack, declarations: D) -> Self {
        Self {
            stack,
            declarations,
        }
    }

    pub fn stack(&self) -> &'s ProjectStack {
        self.stack
    }

    pub fn declarations(&self) -> &D {
        &self.declarations
    }

    /// Path of the declaration file inside `dir`
    pub fn declaration_file(&self, dir: &Path) -> PathBuf {
        dir.join(self.declarations.file_name())
    }

    /// Loads the project in the working directory and pushes it
    pub fn load(&self, app: &AppId, post_config: Table) -> Result<Option<ProjectRef>> {
        let dir = env::current_dir().context("Failed to read current directory")?;
        self.load_in(&dir, app, post_config)
    }

    /// Loads the project declared in `dir` and pushes it
    pub fn load_in(&self, dir: &Path, app: &AppId, post_config: Table) -> Result<Option<ProjectRef>> {
        self.push_project(dir, app, post_config).map(|(p, _)| p)
    }

    /// Loads the project in the working directory for the lifetime of
    /// the returned scope
    pub fn enter(&self, app: &AppId, post_config: Table) -> Result<ProjectScope<'s>> {
        let dir = env::current_dir().context("Failed to read current directory")?;
        let (project, config) = self.push_project(&dir, app, post_config)?;
        Ok(ProjectScope::new(self.stack, project, config))
    }

    /// Loads the project in the working directory for the lifetime of
    /// the returned scope, bypassing the project cache
    ///
    /// Used for the top-level project, whose directory name says nothing
    /// about which application it declares.
    pub fn enter_uncached(&self, post_config: Table) -> Result<ProjectScope<'s>> {
        let dir = env::current_dir().context("Failed to read current directory")?;
        let project = self
            .evaluate_in(&dir)
            .with_context(|| format!("Failed to load project in {}", dir.display()))?;

        self.stack.register_post_config(post_config);
        let config = self.stack.push(project.clone());
        Ok(ProjectScope::new(self.stack, project, config))
    }

    /// Runs `f` with `app` loaded from `dir` as the current project and
    /// `dir` as the working directory. Both are restored afterwards,
    /// whether `f` succeeds or not.
    pub fn in_project<T, F>(&self, app: &AppId, dir: &Path, post_config: Table, f: F) -> Result<T>
    where
        F: FnOnce(&ProjectScope<'s>) -> Result<T>,
    {
        let _cwd = WorkingDir::enter(dir)?;
        let scope = self.enter(app, post_config)?;
        f(&scope)
    }

    fn push_project(
        &self,
        dir: &Path,
        app: &AppId,
        post_config: Table,
    ) -> Result<(Option<ProjectRef>, ProjectConfig)> {
        if let Some(cached) = self.stack.cache_get(app) {
            tracing::debug!(app = %app, "project cache hit");
            let project = cached.into_project();
            self.stack.register_post_config(post_config);
            let config = self.stack.push(project.clone());
            return Ok((project, config));
        }

        let project = self
            .evaluate_in(dir)
            .with_context(|| format!("Failed to load project '{}'", app))?;

        self.stack.register_post_config(post_config);
        let config = self.stack.push(project.clone());
        self.stack
            .cache_put(app.clone(), CachedProject::from_project(project.clone()));

        Ok((project, config))
    }

    fn evaluate_in(&self, dir: &Path) -> Result<Option<ProjectRef>> {
        let file = self.declaration_file(dir);
        if !file.is_file() {
            tracing::debug!(dir = %dir.display(), "no project declaration");
            return Ok(None);
        }

        tracing::debug!(file = %file.display(), "evaluating project declaration");
        Ok(self.declarations.evaluate(&file)?.map(Arc::new))
    }

    /// Existing configuration inputs of the project in the working
    /// directory: the declaration file, then the lockfile
    pub fn config_files(&self) -> Result<Vec<PathBuf>> {
        let dir = env::current_dir().context("Failed to read current directory")?;
        Ok(self.config_files_in(&dir))
    }

    pub fn config_files_in(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let declaration = self.declaration_file(dir);
        if declaration.is_file() {
            files.push(declaration);
        }

        if let Some(lockfile) = self.stack.current_config().lockfile() {
            let lockfile = dir.join(lockfile);
            if lockfile.is_file() {
                files.push(lockfile);
            }
        }

        files
    }
}
