//! Umbrella orchestration
//!
//! An umbrella project keeps its applications in sub-directories of its
//! `apps_path`. [`Umbrella::run`] discovers them, orders them so that
//! every application comes after the siblings it depends on, and runs an
//! operation inside each one with that application as the current
//! project.
//!
//! Applications are processed one at a time: each step changes the
//! process working directory, so orchestration must not run concurrently
//! with itself or with anything else that changes directories.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use toml::Table;

use super::deps::{DeclaredDeps, DependencySource};
use super::loader::{DeclarationLoader, Loader};
use super::manifest::ManifestLoader;
use crate::domain::{AppId, UmbrellaApp, UmbrellaGraph};

/// Orchestrates operations over the applications of an umbrella
#[derive(Debug)]
pub struct Umbrella<'l, 's, D = ManifestLoader, S = DeclaredDeps> {
    loader: &'l Loader<'s, D>,
    deps: S,
}

impl<'l, 's, D: DeclarationLoader> Umbrella<'l, 's, D> {
    /// Orchestrator reading dependencies from the `deps` config key
    pub fn with_declared_deps(loader: &'l Loader<'s, D>) -> Self {
        Self::new(loader, DeclaredDeps)
    }
}

impl<'l, 's, D: DeclarationLoader, S: DependencySource> Umbrella<'l, 's, D, S> {
    pub fn new(loader: &'l Loader<'s, D>, deps: S) -> Self {
        Self { loader, deps }
    }

    pub fn loader(&self) -> &'l Loader<'s, D> {
        self.loader
    }

    /// Lists the application directories directly under `apps_root`,
    /// sorted by directory name. Hidden directories are skipped.
    pub fn discover(&self, apps_root: &Path) -> Result<Vec<UmbrellaApp>> {
        let entries = fs::read_dir(apps_root)
            .with_context(|| format!("Failed to read apps directory: {}", apps_root.display()))?;

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| {
                format!("Failed to read apps directory: {}", apps_root.display())
            })?;
            let path = entry.path();
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if path.is_dir() && !hidden {
                dirs.push(path);
            }
        }
        dirs.sort();

        dirs.into_iter()
            .map(|path| -> Result<UmbrellaApp> {
                let app = AppId::from_dir(&path)?;
                Ok(UmbrellaApp::new(app, path))
            })
            .collect()
    }

    /// Builds the dependency graph of the applications under `apps_root`
    ///
    /// Each application is loaded to read its dependencies; an edge is
    /// added for every dependency that is available and is itself an
    /// application of this umbrella.
    pub fn graph(&self, apps_root: &Path) -> Result<UmbrellaGraph> {
        let root = canonical(apps_root)?;
        let apps = self.discover(&root)?;

        let mut graph = UmbrellaGraph::new();
        for app in &apps {
            graph.add_app(app.clone())?;
        }

        for app in &apps {
            let deps = self
                .loader
                .in_project(&app.app, &app.path, Table::new(), |scope| {
                    self.deps.dependencies(scope.config(), &app.path)
                })
                .with_context(|| format!("Failed to inspect umbrella app '{}'", app.app))?;

            for dep in deps {
                if dep.is_available() && dep.in_umbrella(&root) && graph.contains(&dep.app) {
                    graph.add_dependency(&app.app, &dep.app)?;
                }
            }
        }

        tracing::debug!(root = %root.display(), apps = graph.len(), "built umbrella graph");
        Ok(graph)
    }

    /// Applications under `apps_root`, dependencies first
    ///
    /// Fails with [`GraphError::Cycle`](crate::domain::GraphError::Cycle)
    /// if the applications depend on each other cyclically.
    pub fn ordered_apps(&self, apps_root: &Path) -> Result<Vec<UmbrellaApp>> {
        Ok(self.graph(apps_root)?.topological_order()?)
    }

    /// Runs `op` inside every application under `apps_root` in
    /// dependency order, collecting the results.
    ///
    /// While `op` runs, the application's directory is the working
    /// directory and its project is on top of the stack. Both are
    /// restored before the next application, also when `op` fails. The
    /// first failure stops the run. A dependency cycle fails the run
    /// before `op` is called at all.
    pub fn run<T, F>(&self, apps_root: &Path, mut op: F) -> Result<Vec<T>>
    where
        F: FnMut(&UmbrellaApp) -> Result<T>,
    {
        let order = self.ordered_apps(apps_root)?;

        let mut results = Vec::with_capacity(order.len());
        for app in &order {
            tracing::info!(app = %app.app, path = %app.path.display(), "running in umbrella app");

            let result = self
                .loader
                .in_project(&app.app, &app.path, Table::new(), |_| op(app))
                .with_context(|| format!("Umbrella app '{}' failed", app.app))?;
            results.push(result);
        }

        Ok(results)
    }

    /// Runs `op` over the applications of the current project if it is
    /// an umbrella. Returns `None` for a regular project.
    pub fn recursive<T, F>(&self, op: F) -> Result<Option<Vec<T>>>
    where
        F: FnMut(&UmbrellaApp) -> Result<T>,
    {
        match self.apps_path()? {
            Some(apps_path) => self.run(&apps_path, op).map(Some),
            None => Ok(None),
        }
    }

    /// Absolute apps directory of the current project, if it is an umbrella
    pub fn apps_path(&self) -> Result<Option<PathBuf>> {
        let cwd = env::current_dir().context("Failed to read current directory")?;
        Ok(self.loader.stack().current_config().apps_path(&cwd))
    }

    /// Compile output directories of the current project, or of every
    /// application of an umbrella
    pub fn compile_paths(&self) -> Result<Vec<PathBuf>> {
        if let Some(nested) = self.recursive(|_| self.compile_paths())? {
            return Ok(nested.into_iter().flatten().collect());
        }

        let cwd = env::current_dir().context("Failed to read current directory")?;
        Ok(self
            .loader
            .stack()
            .current_config()
            .compile_path(&cwd)
            .into_iter()
            .collect())
    }

    /// Code load paths: configured `load_paths` followed by compile paths,
    /// collected across umbrella applications
    pub fn load_paths(&self) -> Result<Vec<PathBuf>> {
        if let Some(nested) = self.recursive(|_| self.load_paths())? {
            return Ok(nested.into_iter().flatten().collect());
        }

        let cwd = env::current_dir().context("Failed to read current directory")?;
        let mut paths: Vec<PathBuf> = self
            .loader
            .stack()
            .current_config()
            .get_strings("load_paths")
            .into_iter()
            .map(|p| cwd.join(p))
            .collect();

        paths.extend(self.compile_paths()?);
        Ok(paths)
    }
}

fn canonical(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .with_context(|| format!("Apps directory not found: {}", path.display()))
}
