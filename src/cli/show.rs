//! Context inspection commands

use anyhow::{bail, Context, Result};

use super::output::Output;
use crate::context::{DeclarationLoader, DependencySource, ProjectStack, Umbrella};

/// Prints the effective configuration, or a single key of it
pub fn config(output: &Output, stack: &ProjectStack, key: Option<&str>) -> Result<()> {
    let config = stack.current_config();

    match key {
        Some(key) => {
            let Some(value) = config.get(key) else {
                bail!("Unknown configuration key: {}", key);
            };

            if output.is_json() {
                output.data(value);
            } else {
                match value.as_str() {
                    Some(s) => println!("{}", s),
                    None => println!("{}", value),
                }
            }
        }
        None => {
            if output.is_json() {
                output.data(&config);
            } else {
                let text = toml::to_string(config.as_table())
                    .context("Failed to render configuration")?;
                print!("{}", text);
            }
        }
    }

    Ok(())
}

/// Prints the current project, environment and umbrella status
pub fn info<D, S>(output: &Output, umbrella: &Umbrella<'_, '_, D, S>) -> Result<()>
where
    D: DeclarationLoader,
    S: DependencySource,
{
    let loader = umbrella.loader();
    let stack = loader.stack();
    let project = stack.current();
    let config = stack.current_config();
    let apps_path = umbrella.apps_path()?;
    let files = loader.config_files()?;

    let app = project
        .as_ref()
        .and_then(|p| p.app())
        .map(|a| a.to_string());

    if output.is_json() {
        output.data(&serde_json::json!({
            "project": project.as_ref().map(|p| p.file().display().to_string()),
            "app": app,
            "env": stack.env(),
            "umbrella": config.is_umbrella(),
            "apps_path": apps_path.as_ref().map(|p| p.display().to_string()),
            "config_files": files.iter().map(|f| f.display().to_string()).collect::<Vec<_>>(),
        }));
        return Ok(());
    }

    match &project {
        Some(p) => println!("Project:  {}", p.file().display()),
        None => println!("Project:  (none, using defaults)"),
    }
    println!("App:      {}", app.as_deref().unwrap_or("-"));
    println!("Env:      {}", stack.env());
    println!("Umbrella: {}", if config.is_umbrella() { "yes" } else { "no" });
    if let Some(apps_path) = apps_path {
        println!("Apps:     {}", apps_path.display());
    }
    if !files.is_empty() {
        println!();
        println!("Config files:");
        for file in &files {
            println!("  {}", file.display());
        }
    }

    Ok(())
}

/// Prints compile paths or load paths
pub fn paths<D, S>(output: &Output, umbrella: &Umbrella<'_, '_, D, S>, load: bool) -> Result<()>
where
    D: DeclarationLoader,
    S: DependencySource,
{
    let paths = if load {
        umbrella.load_paths()?
    } else {
        umbrella.compile_paths()?
    };
    output.verbose_ctx("paths", &format!("Resolved {} path(s)", paths.len()));

    if output.is_json() {
        let items: Vec<_> = paths.iter().map(|p| p.display().to_string()).collect();
        output.data(&items);
    } else {
        for path in &paths {
            println!("{}", path.display());
        }
    }

    Ok(())
}
