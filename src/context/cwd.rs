//! Scoped working-directory changes

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Changes the process working directory, restoring the previous one
/// when dropped
#[must_use = "dropping the guard restores the previous directory immediately"]
#[derive(Debug)]
pub struct WorkingDir {
    previous: PathBuf,
}

impl WorkingDir {
    pub fn enter(dir: &Path) -> Result<Self> {
        let previous = env::current_dir().context("Failed to read current directory")?;
        env::set_current_dir(dir)
            .with_context(|| format!("Failed to enter directory: {}", dir.display()))?;
        tracing::trace!(dir = %dir.display(), "entered directory");

        Ok(Self { previous })
    }
}

impl Drop for WorkingDir {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.previous) {
            tracing::warn!(
                dir = %self.previous.display(),
                error = %e,
                "failed to restore working directory"
            );
        }
    }
}
