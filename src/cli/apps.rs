//! Umbrella commands

use std::process::Command;

use anyhow::{bail, Context, Result};

use super::output::Output;
use crate::context::{DeclarationLoader, DependencySource, Umbrella};
use crate::domain::ENV_VAR;

/// Lists umbrella applications in dependency order
pub fn list<D, S>(output: &Output, umbrella: &Umbrella<'_, '_, D, S>) -> Result<()>
where
    D: DeclarationLoader,
    S: DependencySource,
{
    let Some(apps_path) = umbrella.apps_path()? else {
        bail!("Not an umbrella project: no 'apps_path' configured");
    };

    let apps = umbrella.ordered_apps(&apps_path)?;
    output.verbose_ctx("apps", &format!("Found {} app(s) in {}", apps.len(), apps_path.display()));

    if output.is_json() {
        output.data(&apps);
    } else if apps.is_empty() {
        println!("No apps found in {}", apps_path.display());
    } else {
        println!("{:<20} PATH", "APP");
        println!("{}", "-".repeat(60));
        for app in &apps {
            println!("{:<20} {}", app.app, app.path.display());
        }
    }

    Ok(())
}

/// Runs `command` in every umbrella application, dependencies first
pub fn each<D, S>(output: &Output, umbrella: &Umbrella<'_, '_, D, S>, command: &[String]) -> Result<()>
where
    D: DeclarationLoader,
    S: DependencySource,
{
    let Some((program, args)) = command.split_first() else {
        bail!("No command given");
    };

    let Some(apps_path) = umbrella.apps_path()? else {
        bail!("Not an umbrella project: no 'apps_path' configured");
    };

    let env = umbrella.loader().stack().env();
    let ran = umbrella.run(&apps_path, |app| {
        output.line(&format!("==> {}", app.app));
        output.verbose_ctx("each", &format!("Running {} in {}", program, app.path.display()));

        let status = Command::new(program)
            .args(args)
            .env(ENV_VAR, env.as_str())
            .status()
            .with_context(|| format!("Failed to run '{}'", program))?;

        if !status.success() {
            bail!("'{}' exited with {}", program, status);
        }

        Ok(app.app.clone())
    })?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "success": true,
            "apps": ran,
        }));
    } else {
        output.success(&format!("Ran '{}' in {} app(s)", program, ran.len()));
    }

    Ok(())
}
