//! The active project stack
//!
//! [`ProjectStack`] is the single owner of the mutable project state: the
//! stack of active (project, config) frames, the per-application project
//! cache and the one-shot post-config overlay. Every operation takes the
//! internal lock once, so read-then-write sequences never interleave.
//!
//! Frames are normally pushed through [`ProjectStack::enter`], whose
//! [`ProjectScope`] pops the frame again when dropped.

use std::collections::HashMap;

use parking_lot::Mutex;
use thiserror::Error;
use toml::Table;

use crate::domain::{merge_config, overlay, AppId, BuildEnv, ProjectConfig, ProjectRef};

#[derive(Debug, Error, PartialEq)]
pub enum StackError {
    #[error("Cannot pop project: the project stack is empty")]
    Empty,

    #[error("No project is loaded. Run this command inside a directory with a project declaration.")]
    NoProject,
}

/// One entry of the active project stack
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// `None` when no declaration was found (defaults placeholder)
    pub project: Option<ProjectRef>,

    /// Effective configuration computed at push time
    pub config: ProjectConfig,
}

/// A project cache entry
///
/// A missing entry means "never loaded"; [`CachedProject::NoProject`]
/// means the application was loaded and declared no project.
#[derive(Debug, Clone)]
pub enum CachedProject {
    NoProject,
    Loaded(ProjectRef),
}

impl CachedProject {
    pub fn from_project(project: Option<ProjectRef>) -> Self {
        match project {
            Some(p) => CachedProject::Loaded(p),
            None => CachedProject::NoProject,
        }
    }

    pub fn project(&self) -> Option<&ProjectRef> {
        match self {
            CachedProject::Loaded(p) => Some(p),
            CachedProject::NoProject => None,
        }
    }

    pub fn into_project(self) -> Option<ProjectRef> {
        match self {
            CachedProject::Loaded(p) => Some(p),
            CachedProject::NoProject => None,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    frames: Vec<Frame>,
    cache: HashMap<AppId, CachedProject>,
    post_config: Table,
    env: BuildEnv,
}

/// Shared project state
#[derive(Debug)]
pub struct ProjectStack {
    defaults: ProjectConfig,
    state: Mutex<State>,
}

impl Default for ProjectStack {
    fn default() -> Self {
        Self::new(BuildEnv::default())
    }
}

impl ProjectStack {
    /// Creates an empty stack using the built-in default configuration
    pub fn new(env: BuildEnv) -> Self {
        Self::with_defaults(ProjectConfig::defaults(), env)
    }

    pub fn with_defaults(defaults: ProjectConfig, env: BuildEnv) -> Self {
        Self {
            defaults,
            state: Mutex::new(State {
                env,
                ..State::default()
            }),
        }
    }

    pub fn defaults(&self) -> &ProjectConfig {
        &self.defaults
    }

    pub fn env(&self) -> BuildEnv {
        self.state.lock().env.clone()
    }

    /// Changes the build environment used by subsequent pushes
    pub fn set_env(&self, env: BuildEnv) {
        tracing::debug!(env = %env, "build environment changed");
        self.state.lock().env = env;
    }

    /// Pushes a project, computing and returning its effective config
    ///
    /// A pending post-config is consumed as a declared-config layer that
    /// the project's own declaration overrides.
    pub fn push(&self, project: Option<ProjectRef>) -> ProjectConfig {
        let mut state = self.state.lock();

        let mut declared = std::mem::take(&mut state.post_config);
        if let Some(p) = &project {
            overlay(&mut declared, p.declared());
        }

        let config = merge_config(&self.defaults, Some(&declared), &state.env);
        tracing::debug!(
            app = ?project.as_ref().and_then(|p| p.app()),
            depth = state.frames.len() + 1,
            "pushed project"
        );

        state.frames.push(Frame {
            project,
            config: config.clone(),
        });
        config
    }

    /// Removes and returns the top frame
    pub fn pop(&self) -> Result<Frame, StackError> {
        let mut state = self.state.lock();
        let frame = state.frames.pop().ok_or(StackError::Empty)?;
        tracing::debug!(
            app = ?frame.project.as_ref().and_then(|p| p.app()),
            depth = state.frames.len(),
            "popped project"
        );
        Ok(frame)
    }

    /// Pushes a project and returns a scope that pops it on drop
    pub fn enter(&self, project: Option<ProjectRef>) -> ProjectScope<'_> {
        let config = self.push(project.clone());
        ProjectScope::new(self, project, config)
    }

    /// The project on top of the stack, if any
    pub fn current(&self) -> Option<ProjectRef> {
        self.state
            .lock()
            .frames
            .last()
            .and_then(|f| f.project.clone())
    }

    /// Like [`current`](Self::current), but a missing project is an error
    pub fn require_current(&self) -> Result<ProjectRef, StackError> {
        self.current().ok_or(StackError::NoProject)
    }

    /// Configuration of the current project, or the defaults when no
    /// project is loaded
    pub fn current_config(&self) -> ProjectConfig {
        let state = self.state.lock();
        match state.frames.last() {
            Some(Frame {
                project: Some(_),
                config,
            }) => config.clone(),
            _ => self.defaults.clone(),
        }
    }

    /// The top frame, without removing it
    pub fn peek(&self) -> Option<Frame> {
        self.state.lock().frames.last().cloned()
    }

    pub fn depth(&self) -> usize {
        self.state.lock().frames.len()
    }

    pub fn cache_get(&self, app: &AppId) -> Option<CachedProject> {
        self.state.lock().cache.get(app).cloned()
    }

    pub fn cache_put(&self, app: AppId, entry: CachedProject) {
        tracing::debug!(app = %app, loaded = entry.project().is_some(), "cached project");
        self.state.lock().cache.insert(app, entry);
    }

    pub fn clear_cache(&self) {
        self.state.lock().cache.clear();
    }

    /// Stores an overlay applied to the next pushed project only
    pub fn register_post_config(&self, config: Table) {
        self.state.lock().post_config = config;
    }
}

/// A pushed frame that is popped when the scope ends
#[must_use = "dropping the scope pops the project immediately"]
#[derive(Debug)]
pub struct ProjectScope<'a> {
    stack: &'a ProjectStack,
    project: Option<ProjectRef>,
    config: ProjectConfig,
    active: bool,
}

impl<'a> ProjectScope<'a> {
    /// Wraps a frame that has already been pushed onto `stack`
    pub(crate) fn new(
        stack: &'a ProjectStack,
        project: Option<ProjectRef>,
        config: ProjectConfig,
    ) -> Self {
        Self {
            stack,
            project,
            config,
            active: true,
        }
    }

    pub fn project(&self) -> Option<&ProjectRef> {
        self.project.as_ref()
    }

    /// Effective configuration computed when the frame was pushed
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Pops the frame now, returning it
    pub fn close(mut self) -> Result<Frame, StackError> {
        self.active = false;
        self.stack.pop()
    }
}

impl Drop for ProjectScope<'_> {
    fn drop(&mut self) {
        if self.active {
            if let Err(e) = self.stack.pop() {
                tracing::warn!(error = %e, "failed to pop project scope");
            }
        }
    }
}
