//! # Project Context
//!
//! Stateful layer tracking which project is active and running work
//! across umbrella applications.
//!
//! ## Key Types
//!
//! - [`ProjectStack`] - Active project frames, project cache, post-config
//! - [`Loader`] - Evaluates declarations and pushes projects
//! - [`ManifestLoader`] - Reads `mix.toml` declaration files
//! - [`Umbrella`] - Orders umbrella applications and runs work in each
//! - [`Settings`] - Settings of the tool itself
//!
//! ## Scoping
//!
//! Frames and working-directory changes are tied to guards
//! ([`ProjectScope`], [`WorkingDir`]) that undo them when dropped, so
//! early returns and failures never leave a frame behind.

mod cwd;
mod deps;
mod loader;
mod manifest;
mod settings;
mod stack;
mod umbrella;

pub use cwd::WorkingDir;
pub use deps::{DeclaredDeps, Dependency, DependencySource, DepsError};
pub use loader::{DeclarationLoader, Loader};
pub use manifest::{ManifestError, ManifestLoader, DECLARATION_FILE};
pub use settings::{Settings, SettingsError};
pub use stack::{CachedProject, Frame, ProjectScope, ProjectStack, StackError};
pub use umbrella::Umbrella;
