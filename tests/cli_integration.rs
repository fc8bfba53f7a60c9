//! CLI integration tests for mixctx
//!
//! Each test builds a scratch project tree and runs the binary inside it.

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a command instance for the mixctx binary
fn mixctx_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("mixctx"));
    cmd.env_remove("MIX_ENV").env_remove("RUST_LOG");
    cmd
}

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Umbrella with `apps/web` depending on `apps/core`
fn setup_umbrella() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "mix.toml", "[project]\napp = \"platform\"\napps_path = \"apps\"\n");
    write(
        dir.path(),
        "apps/web/mix.toml",
        "[project]\napp = \"web\"\ndeps = [{ app = \"core\", in_umbrella = true }]\n",
    );
    write(dir.path(), "apps/core/mix.toml", "[project]\napp = \"core\"\n");
    dir
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_without_project_uses_defaults() {
    let dir = TempDir::new().unwrap();

    mixctx_cmd()
        .current_dir(dir.path())
        .args(["config", "--key", "lockfile"])
        .assert()
        .success()
        .stdout("mix.lock\n");
}

#[test]
fn test_config_json_includes_declared_values() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "mix.toml", "[project]\napp = \"core\"\ncompile_path = \"out\"\n");

    let output = mixctx_cmd()
        .current_dir(dir.path())
        .args(["config", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["compile_path"], "out");
    assert_eq!(json["deps_path"], "deps");
    assert_eq!(json["app"], "core");
}

#[test]
fn test_config_unknown_key_fails() {
    let dir = TempDir::new().unwrap();

    mixctx_cmd()
        .current_dir(dir.path())
        .args(["config", "--key", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_env_flag_selects_overlay() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "mix.toml",
        "[project]\ncompile_path = \"out\"\n\n[project.env.prod]\ncompile_path = \"prod_out\"\n",
    );

    mixctx_cmd()
        .current_dir(dir.path())
        .args(["--env", "prod", "config", "--key", "compile_path"])
        .assert()
        .success()
        .stdout("prod_out\n");

    mixctx_cmd()
        .current_dir(dir.path())
        .env("MIX_ENV", "prod")
        .args(["config", "--key", "compile_path"])
        .assert()
        .success()
        .stdout("prod_out\n");

    mixctx_cmd()
        .current_dir(dir.path())
        .args(["config", "--key", "compile_path"])
        .assert()
        .success()
        .stdout("out\n");
}

#[test]
fn test_default_env_for_task_switches_environment() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "mix.toml",
        r#"
[project]
compile_path = "out"

[project.default_env]
config = "test"

[project.env.test]
compile_path = "test_out"
"#,
    );

    mixctx_cmd()
        .current_dir(dir.path())
        .args(["config", "--key", "compile_path"])
        .assert()
        .success()
        .stdout("test_out\n");

    // an explicit environment wins over default_env
    mixctx_cmd()
        .current_dir(dir.path())
        .args(["--env", "dev", "config", "--key", "compile_path"])
        .assert()
        .success()
        .stdout("out\n");
}

#[test]
fn test_invalid_declaration_fails() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "mix.toml", "[project\n");

    mixctx_cmd()
        .current_dir(dir.path())
        .arg("info")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse project declaration"));
}

// =============================================================================
// Info and paths
// =============================================================================

#[test]
fn test_info_reports_project_and_config_files() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "mix.toml", "[project]\napp = \"core\"\n");
    write(dir.path(), "mix.lock", "");

    let output = mixctx_cmd()
        .current_dir(dir.path())
        .args(["info", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["app"], "core");
    assert_eq!(json["env"], "dev");
    assert_eq!(json["umbrella"], false);

    let files = json["config_files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert!(files[0].as_str().unwrap().ends_with("mix.toml"));
    assert!(files[1].as_str().unwrap().ends_with("mix.lock"));
}

#[test]
fn test_info_without_project() {
    let dir = TempDir::new().unwrap();

    mixctx_cmd()
        .current_dir(dir.path())
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("none, using defaults"))
        .stdout(predicate::str::contains("Umbrella: no"));
}

#[test]
fn test_paths_for_single_project() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "mix.toml", "[project]\napp = \"core\"\n");

    mixctx_cmd()
        .current_dir(dir.path())
        .arg("paths")
        .assert()
        .success()
        .stdout(predicate::str::ends_with("ebin\n"));
}

#[test]
fn test_paths_across_umbrella() {
    let dir = setup_umbrella();

    let output = mixctx_cmd()
        .current_dir(dir.path())
        .args(["paths", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let paths: Vec<String> = serde_json::from_str(&stdout).unwrap();
    assert_eq!(paths.len(), 2);
    assert!(paths[0].ends_with("core/ebin"));
    assert!(paths[1].ends_with("web/ebin"));
}

// =============================================================================
// Umbrella commands
// =============================================================================

#[test]
fn test_apps_lists_dependencies_first() {
    let dir = setup_umbrella();

    let output = mixctx_cmd()
        .current_dir(dir.path())
        .args(["apps", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let apps: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["app"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(apps, vec!["core", "web"]);
}

#[test]
fn test_apps_with_root_named_like_member() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("api");
    write(&root, "mix.toml", "[project]\napp = \"platform\"\napps_path = \"apps\"\n");
    write(
        &root,
        "apps/api/mix.toml",
        "[project]\napp = \"api\"\ndeps = [{ app = \"zeta\", in_umbrella = true }]\n",
    );
    write(&root, "apps/zeta/mix.toml", "[project]\napp = \"zeta\"\n");

    let output = mixctx_cmd()
        .current_dir(&root)
        .args(["apps", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let apps: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["app"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(apps, vec!["zeta", "api"]);
}

#[test]
fn test_apps_cycle_fails() {
    let dir = setup_umbrella();
    write(
        dir.path(),
        "apps/core/mix.toml",
        "[project]\napp = \"core\"\ndeps = [{ app = \"web\", in_umbrella = true }]\n",
    );

    mixctx_cmd()
        .current_dir(dir.path())
        .arg("apps")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cyclic dependency among core, web"));
}

#[test]
fn test_apps_outside_umbrella_fails() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "mix.toml", "[project]\napp = \"core\"\n");

    mixctx_cmd()
        .current_dir(dir.path())
        .arg("apps")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not an umbrella project"));
}

#[cfg(unix)]
#[test]
fn test_each_runs_in_every_app() {
    let dir = setup_umbrella();

    mixctx_cmd()
        .current_dir(dir.path())
        .args(["each", "--", "touch", "visited"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ran 'touch' in 2 app(s)"));

    assert!(dir.path().join("apps/core/visited").is_file());
    assert!(dir.path().join("apps/web/visited").is_file());
    assert!(!dir.path().join("visited").exists());
}

#[cfg(unix)]
#[test]
fn test_each_stops_on_failure() {
    let dir = setup_umbrella();

    mixctx_cmd()
        .current_dir(dir.path())
        .args(["each", "--", "false"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Umbrella app 'core' failed"));
}
