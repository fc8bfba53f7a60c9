//! Project configuration and layered merging
//!
//! The effective configuration of a project is built from three layers,
//! later layers overriding earlier ones key by key:
//!
//! 1. Static defaults built into the tool ([`ProjectConfig::defaults`])
//! 2. The project's declared configuration
//! 3. The `env.<build-env>` overlay from the declared configuration
//!
//! Values are TOML values; symbolic values such as source extensions are
//! plain strings.

use std::path::{Path, PathBuf};

use serde::Serialize;
use toml::{Table, Value};

use super::env::BuildEnv;

/// Key of the environment overlay table inside a declared configuration
pub const ENV_KEY: &str = "env";

/// An effective (merged) project configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ProjectConfig(Table);

impl ProjectConfig {
    /// The static default configuration
    pub fn defaults() -> Self {
        let mut t = Table::new();
        t.insert("compile_path".into(), Value::from("ebin"));
        t.insert("default_env".into(), Value::Table(single("test", "test")));
        t.insert("default_task".into(), Value::from("run"));
        t.insert("deps_path".into(), Value::from("deps"));
        t.insert("source_exts".into(), strings(&["ex"]));
        t.insert("source_paths".into(), strings(&["lib"]));
        t.insert("watch_exts".into(), strings(&["ex", "eex", "exs"]));
        t.insert("load_paths".into(), Value::Array(Vec::new()));
        t.insert("lockfile".into(), Value::from("mix.lock"));
        t.insert("native_source_paths".into(), strings(&["src"]));
        t.insert("native_include_path".into(), Value::from("include"));
        t.insert("native_options".into(), strings(&["debug_info"]));
        Self(t)
    }

    pub fn from_table(table: Table) -> Self {
        Self(table)
    }

    pub fn as_table(&self) -> &Table {
        &self.0
    }

    pub fn into_table(self) -> Table {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Returns a list of strings, skipping non-string entries
    pub fn get_strings(&self, key: &str) -> Vec<String> {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True iff the configuration names an `apps_path`
    pub fn is_umbrella(&self) -> bool {
        self.get_str("apps_path").is_some()
    }

    /// Absolute apps directory of an umbrella project, relative paths
    /// resolved against `project_dir`
    pub fn apps_path(&self, project_dir: &Path) -> Option<PathBuf> {
        self.get_str("apps_path").map(|p| expand(project_dir, p))
    }

    pub fn compile_path(&self, project_dir: &Path) -> Option<PathBuf> {
        self.get_str("compile_path").map(|p| expand(project_dir, p))
    }

    pub fn lockfile(&self) -> Option<&str> {
        self.get_str("lockfile")
    }

    pub fn deps_path(&self) -> Option<&str> {
        self.get_str("deps_path")
    }

    /// Build environment configured for a task through `default_env`
    pub fn default_env_for(&self, task: &str) -> Option<BuildEnv> {
        self.get("default_env")
            .and_then(Value::as_table)
            .and_then(|t| t.get(task))
            .and_then(Value::as_str)
            .map(BuildEnv::new)
    }
}

/// Merges the static defaults, a declared configuration and the
/// environment overlay into an effective configuration.
///
/// When `declared` is `None` the result is exactly `defaults`. The `env`
/// entry is dropped from the result only when it holds a table for the
/// active environment.
pub fn merge_config(
    defaults: &ProjectConfig,
    declared: Option<&Table>,
    env: &BuildEnv,
) -> ProjectConfig {
    let mut merged = defaults.0.clone();

    let Some(declared) = declared else {
        return ProjectConfig(merged);
    };

    overlay(&mut merged, declared);

    let env_overlay = declared
        .get(ENV_KEY)
        .and_then(Value::as_table)
        .and_then(|envs| envs.get(env.as_str()))
        .and_then(Value::as_table);

    if let Some(env_overlay) = env_overlay {
        merged.remove(ENV_KEY);
        overlay(&mut merged, env_overlay);
    }

    ProjectConfig(merged)
}

/// Copies every entry of `top` into `base`, replacing existing keys
pub fn overlay(base: &mut Table, top: &Table) {
    for (key, value) in top {
        base.insert(key.clone(), value.clone());
    }
}

fn expand(base: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn strings(items: &[&str]) -> Value {
    Value::Array(items.iter().map(|s| Value::from(*s)).collect())
}

fn single(key: &str, value: &str) -> Table {
    let mut t = Table::new();
    t.insert(key.into(), Value::from(value));
    t
}
