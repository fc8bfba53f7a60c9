//! Domain models for mix-context
//!
//! Pure types and algorithms without any I/O: application identifiers,
//! configuration merging, project declarations and the umbrella graph.

mod app_id;
mod config;
mod env;
mod graph;
mod project;

pub use app_id::{AppId, AppIdError};
pub use config::{merge_config, overlay, ProjectConfig, ENV_KEY};
pub use env::{BuildEnv, ENV_VAR};
pub use graph::{GraphError, UmbrellaApp, UmbrellaGraph};
pub use project::{Project, ProjectRef};
