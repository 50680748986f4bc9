//! CLI integration tests for agentshift
//!
//! These tests run the binary against temporary project trees, from
//! initialization through conversion and plugin inspection.

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a command instance for the agentshift binary with an isolated global config
fn agentshift_cmd(config_dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("agentshift"));
    cmd.env("AGENTSHIFT_CONFIG_DIR", config_dir);
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write(root: &Path, path: &str, content: &str) {
    let full = root.join(path);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, content).unwrap();
}

/// A Cursor project whose always-on rule points at another rule
fn cursor_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        ".cursor/rules/basics.mdc",
        "---\nalwaysApply: true\n---\nFollow .cursor/rules/api.mdc when touching handlers.\n",
    );
    write(
        dir.path(),
        ".cursor/rules/api.mdc",
        "---\ndescription: API conventions\n---\nValidate every request.\n",
    );
    write(
        dir.path(),
        ".cursor/rules/typescript.mdc",
        "---\nglobs: *.ts, *.tsx\n---\nPrefer strict mode.\n",
    );
    write(dir.path(), ".cursorignore", ".env\nnode_modules/\n");
    dir
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_structure() {
    let config = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();

    agentshift_cmd(config.path())
        .arg("init")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized agentshift project"));

    assert!(dir.path().join(".agentshift").is_dir());
    assert!(dir.path().join(".agentshift/plugins").is_dir());
    assert!(dir.path().join(".agentshift/config.toml").is_file());
}

#[test]
fn test_init_is_idempotent() {
    let config = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();

    agentshift_cmd(config.path()).arg("init").arg(dir.path()).assert().success();
    agentshift_cmd(config.path()).arg("init").arg(dir.path()).assert().success();
}

// =============================================================================
// Conversion Tests
// =============================================================================

#[test]
fn test_convert_cursor_to_claude() {
    let config = TempDir::new().unwrap();
    let project = cursor_project();

    agentshift_cmd(config.path())
        .current_dir(project.path())
        .args(["convert", "--from", "cursor", "--to", "claude"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CLAUDE.md"))
        .stdout(predicate::str::contains(".claude/commands/api.md"))
        .stderr(predicate::str::contains("[skipped]"));

    let memory = fs::read_to_string(project.path().join("CLAUDE.md")).unwrap();
    assert!(memory.contains("Follow .claude/commands/api.md when touching handlers."));
    assert!(memory.contains("Applies to: `*.ts`, `*.tsx`"));
    assert!(!memory.contains(".cursor/rules/api.mdc"));

    let command = fs::read_to_string(project.path().join(".claude/commands/api.md")).unwrap();
    assert!(command.contains("description: API conventions"));
}

#[test]
fn test_convert_to_separate_target() {
    let config = TempDir::new().unwrap();
    let project = cursor_project();
    let target = TempDir::new().unwrap();

    agentshift_cmd(config.path())
        .args(["convert", "--from", "cursor", "--to", "claude", "--source"])
        .arg(project.path())
        .arg("--target")
        .arg(target.path())
        .assert()
        .success();

    assert!(target.path().join("CLAUDE.md").is_file());
    assert!(!project.path().join("CLAUDE.md").exists());
}

#[test]
fn test_convert_dry_run_writes_nothing() {
    let config = TempDir::new().unwrap();
    let project = cursor_project();
    let target = TempDir::new().unwrap();

    agentshift_cmd(config.path())
        .args(["convert", "--from", "cursor", "--to", "claude", "--dry-run", "--source"])
        .arg(project.path())
        .arg("--target")
        .arg(target.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("would create"))
        .stdout(predicate::str::contains("Would write"));

    assert!(fs::read_dir(target.path()).unwrap().next().is_none());
}

#[test]
fn test_convert_no_rewrite_keeps_references() {
    let config = TempDir::new().unwrap();
    let project = cursor_project();

    agentshift_cmd(config.path())
        .current_dir(project.path())
        .args(["convert", "--from", "cursor", "--to", "claude", "--no-rewrite"])
        .assert()
        .success();

    let memory = fs::read_to_string(project.path().join("CLAUDE.md")).unwrap();
    assert!(memory.contains(".cursor/rules/api.mdc"));
}

#[test]
fn test_convert_existing_file_is_renamed_without_force() {
    let config = TempDir::new().unwrap();
    let project = cursor_project();
    write(project.path(), "CLAUDE.md", "hand written\n");

    agentshift_cmd(config.path())
        .current_dir(project.path())
        .args(["convert", "--from", "cursor", "--to", "claude"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[renamed]"));

    assert_eq!(fs::read_to_string(project.path().join("CLAUDE.md")).unwrap(), "hand written\n");
    assert!(project.path().join("CLAUDE-2.md").is_file());
}

#[test]
fn test_convert_force_overwrites() {
    let config = TempDir::new().unwrap();
    let project = cursor_project();
    write(project.path(), "CLAUDE.md", "hand written\n");

    agentshift_cmd(config.path())
        .current_dir(project.path())
        .args(["convert", "--from", "cursor", "--to", "claude", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("updated"));

    let memory = fs::read_to_string(project.path().join("CLAUDE.md")).unwrap();
    assert!(memory.contains("Prefer strict mode."));
}

#[test]
fn test_convert_json_output() {
    let config = TempDir::new().unwrap();
    let project = cursor_project();

    let output = agentshift_cmd(config.path())
        .args(["--format", "json", "convert", "--from", "cursor", "--to", "claude"])
        .args(["--dry-run", "--source"])
        .arg(project.path())
        .arg("--target")
        .arg(project.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["source"], "cursor");
    assert_eq!(json["dry_run"], true);
    assert_eq!(json["discovered"], 4);
    assert_eq!(json["unsupported"][0]["kind"], "ignore_list");
    assert!(json["written"]
        .as_array()
        .unwrap()
        .iter()
        .any(|w| w["path"] == "CLAUDE.md" && w["item_count"] == 2));
}

#[test]
fn test_convert_unknown_plugin_fails() {
    let config = TempDir::new().unwrap();
    let project = cursor_project();

    agentshift_cmd(config.path())
        .current_dir(project.path())
        .args(["convert", "--from", "windsurf", "--to", "claude"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown plugin 'windsurf'"));
}

#[test]
fn test_claude_to_cursor_roundtrip() {
    let config = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    write(project.path(), "CLAUDE.md", "Use cargo. See .claude/commands/review.md\n");
    write(
        project.path(),
        ".claude/commands/review.md",
        "---\ndescription: Review a change\n---\nCheck tests.\n",
    );

    agentshift_cmd(config.path())
        .current_dir(project.path())
        .args(["convert", "--from", "claude", "--to", "cursor"])
        .assert()
        .success();

    let global = fs::read_to_string(project.path().join(".cursor/rules/claude.mdc")).unwrap();
    assert!(global.contains("alwaysApply: true"));
    assert!(global.contains(".cursor/rules/review.mdc"));
    assert!(project.path().join(".cursor/rules/review.mdc").is_file());
}

// =============================================================================
// Discovery Tests
// =============================================================================

#[test]
fn test_discover_lists_items() {
    let config = TempDir::new().unwrap();
    let project = cursor_project();

    agentshift_cmd(config.path())
        .current_dir(project.path())
        .args(["discover", "--from", "cursor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("global_prompt"))
        .stdout(predicate::str::contains("file_rule"))
        .stdout(predicate::str::contains("ignore_list"))
        .stdout(predicate::str::contains(".cursor/rules/api.mdc"));
}

#[test]
fn test_discover_reports_unreadable_files() {
    let config = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    write(project.path(), ".cursor/rules/broken.mdc", "---\ndescription: no end\n");

    agentshift_cmd(config.path())
        .current_dir(project.path())
        .args(["discover", "--from", "cursor"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[unreadable]"));
}

// =============================================================================
// Plugin Tests
// =============================================================================

#[test]
fn test_plugin_list_shows_builtins() {
    let config = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();

    agentshift_cmd(config.path())
        .current_dir(dir.path())
        .args(["plugin", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cursor"))
        .stdout(predicate::str::contains("claude"))
        .stdout(predicate::str::contains("builtin"));
}

#[test]
fn test_plugin_show_json() {
    let config = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();

    let output = agentshift_cmd(config.path())
        .current_dir(dir.path())
        .args(["--format", "json", "plugin", "show", "cursor"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["id"], "cursor");
    assert_eq!(json["origin"], "builtin");
    assert_eq!(json["path_patterns"]["extensions"][0], "mdc");
}

#[test]
fn test_plugin_show_unknown_fails() {
    let config = TempDir::new().unwrap();
    let dir = TempDir::new().unwrap();

    agentshift_cmd(config.path())
        .current_dir(dir.path())
        .args(["plugin", "show", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Plugin not found: nope"));
}

#[cfg(unix)]
mod external {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn install_plugin(dir: &Path, file: &str, manifest: &str) {
        let path = dir.join(file);
        fs::create_dir_all(dir).unwrap();
        fs::write(
            &path,
            format!("#!/bin/sh\nif [ \"$1\" = \"--manifest\" ]; then\n  echo '{}'\nfi\n", manifest),
        )
        .unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn plugin_manifest(id: &str, name: &str, version: Option<&str>) -> String {
        serde_json::json!({
            "id": id,
            "name": name,
            "version": version,
            "kinds": ["global_prompt"],
            "operations": ["discover", "emit"],
        })
        .to_string()
    }

    #[test]
    fn test_plugin_list_includes_project_plugins_and_errors() {
        let config = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        agentshift_cmd(config.path()).arg("init").arg(project.path()).assert().success();

        let plugins = project.path().join(".agentshift/plugins");
        install_plugin(
            &plugins,
            "agentshift-plugin-windsurf",
            &plugin_manifest("windsurf", "Windsurf", Some("0.3.0")),
        );
        install_plugin(&plugins, "agentshift-plugin-broken", r#"{"id":"broken"}"#);

        agentshift_cmd(config.path())
            .current_dir(project.path())
            .args(["plugin", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("windsurf"))
            .stdout(predicate::str::contains("discovered"))
            .stdout(predicate::str::contains("0.3.0"))
            .stdout(predicate::str::contains("Invalid plugin packages"))
            .stdout(predicate::str::contains("agentshift-plugin-broken"));
    }

    #[test]
    fn test_conflicting_plugin_is_skipped_by_default() {
        let config = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        agentshift_cmd(config.path()).arg("init").arg(project.path()).assert().success();

        install_plugin(
            &project.path().join(".agentshift/plugins"),
            "agentshift-plugin-cursor",
            &plugin_manifest("cursor", "Fake Cursor", None),
        );

        agentshift_cmd(config.path())
            .current_dir(project.path())
            .args(["plugin", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Skipped:"))
            .stdout(predicate::str::contains("Fake Cursor").not());
    }

    #[test]
    fn test_fail_strategy_aborts() {
        let config = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        agentshift_cmd(config.path()).arg("init").arg(project.path()).assert().success();

        install_plugin(
            &project.path().join(".agentshift/plugins"),
            "agentshift-plugin-claude",
            &plugin_manifest("claude", "Fake Claude", None),
        );

        agentshift_cmd(config.path())
            .current_dir(project.path())
            .args(["convert", "--from", "cursor", "--to", "claude", "--conflict-strategy", "fail"])
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "conflicts with an already registered builtin plugin",
            ));
    }
}
