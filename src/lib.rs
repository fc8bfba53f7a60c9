//! mix-context - project context management for mix-style builds
//!
//! Tracks which project is active, resolves its effective configuration
//! (static defaults, declared configuration, environment overlay) and
//! runs work across the applications of an umbrella project in
//! dependency order.

pub mod cli;
pub mod context;
pub mod domain;

pub use context::{Loader, ProjectStack, Umbrella};
pub use domain::{AppId, BuildEnv, Project, ProjectConfig};
