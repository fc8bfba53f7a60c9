//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};
use toml::Table;

use super::output::{Output, OutputFormat};
use super::{apps, logging, show};
use crate::context::{Loader, ManifestLoader, ProjectScope, ProjectStack, Settings, Umbrella};
use crate::domain::BuildEnv;

#[derive(Parser)]
#[command(name = "mixctx")]
#[command(author, version, about = "Project context and umbrella orchestration for mix-style builds")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Build environment (takes precedence over MIX_ENV)
    #[arg(long, short = 'e', global = true)]
    pub env: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the effective configuration of the current project
    Config {
        /// Print a single key
        #[arg(long)]
        key: Option<String>,
    },

    /// Show the current project context
    Info,

    /// Print compile paths (or load paths with --load)
    Paths {
        /// Print load paths instead of compile paths
        #[arg(long)]
        load: bool,
    },

    /// List umbrella applications in dependency order
    Apps,

    /// Run a program inside each umbrella application in dependency order
    Each {
        /// Program and arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
}

impl Commands {
    /// Task name used to look up `default_env`
    fn task_name(&self) -> &'static str {
        match self {
            Commands::Config { .. } => "config",
            Commands::Info => "info",
            Commands::Paths { .. } => "paths",
            Commands::Apps => "apps",
            Commands::Each { .. } => "each",
        }
    }
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let output = Output::new(cli.format, cli.verbose);

    let settings = Settings::load()?;
    let explicit_env = cli
        .env
        .as_deref()
        .map(BuildEnv::new)
        .or_else(BuildEnv::from_process_env)
        .or_else(|| settings.env.clone());

    let stack = ProjectStack::new(explicit_env.clone().unwrap_or_default());
    let loader = Loader::new(&stack, ManifestLoader::new(settings.declaration_file.as_str()));
    let umbrella = Umbrella::with_declared_deps(&loader);

    let task = cli.command.task_name();
    let _scope = enter_current(&loader, task, explicit_env.is_none(), &output)?;
    output.verbose_ctx(task, &format!("Build environment: {}", stack.env()));

    match cli.command {
        Commands::Config { key } => show::config(&output, &stack, key.as_deref())?,
        Commands::Info => show::info(&output, &umbrella)?,
        Commands::Paths { load } => show::paths(&output, &umbrella, load)?,
        Commands::Apps => apps::list(&output, &umbrella)?,
        Commands::Each { command } => apps::each(&output, &umbrella, &command)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}

/// Loads the project in the working directory. Without an explicit
/// environment, the project's `default_env` entry for `task` may switch
/// the environment, in which case the project is loaded again.
/// The top-level project is never cached under an application
/// identifier.
fn enter_current<'s>(
    loader: &Loader<'s>,
    task: &str,
    env_may_change: bool,
    output: &Output,
) -> Result<ProjectScope<'s>> {
    let scope = loader.enter_uncached(Table::new())?;
    if let Some(app) = scope.project().and_then(|p| p.app()) {
        output.verbose_ctx("load", &format!("Loaded project '{}'", app));
    }

    if !env_may_change {
        return Ok(scope);
    }

    let stack = loader.stack();
    let task_env = scope.config().default_env_for(task);
    match task_env {
        Some(env) if env != stack.env() => {
            output.verbose_ctx("load", &format!("Switching to '{}' environment for {}", env, task));
            scope.close()?;
            stack.set_env(env);
            stack.clear_cache();
            loader.enter_uncached(Table::new())
        }
        _ => Ok(scope),
    }
}
