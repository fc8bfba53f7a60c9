//! # Command-Line Interface
//!
//! User-facing `mixctx` commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `config` | Effective configuration of the current project |
//! | `info` | Current project, environment, umbrella status |
//! | `paths` | Compile or load paths, across umbrella apps |
//! | `apps` | Umbrella apps in dependency order |
//! | `each` | Run a program in every umbrella app |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod apps;
mod logging;
mod output;
mod show;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
