//! Command line tests for the `build`, `list` and `reset` commands.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn cli(settings: &Path, cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kodegen_bundler_assets").unwrap();
    cmd.current_dir(cwd)
        .env_remove("RUST_LOG")
        .arg("--settings")
        .arg(settings);
    cmd
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("Assets/AssetBundles/source");
    std::fs::create_dir_all(&source).unwrap();
    std::fs::write(source.join("Chair.prefab"), b"chair").unwrap();
    std::fs::write(source.join("Lamp variant.prefab"), b"lamp").unwrap();
    dir
}

#[test]
fn test_build_then_list() {
    let dir = project();
    let settings = dir.path().join("settings.toml");

    cli(&settings, dir.path())
        .args(["build", "--strip-variant", "true"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Built 2 bundle(s)"));

    assert!(dir.path().join("AssetBundles/chair/source.unity3d").is_file());
    assert!(dir.path().join("AssetBundles/lamp/config.json").is_file());
    assert!(settings.is_file());
    assert!(
        std::fs::read_to_string(&settings)
            .unwrap()
            .contains("strip_variant = true")
    );

    cli(&settings, dir.path())
        .args(["-q", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("chair, Version: 1, Contents: 1, Size: "))
        .stdout(predicate::str::contains("lamp, Version: 1, Contents: 1, Size: "));
}

#[test]
fn test_build_no_save_leaves_settings_alone() {
    let dir = project();
    let settings = dir.path().join("settings.toml");

    cli(&settings, dir.path())
        .args(["build", "--no-save", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"bundles\""));

    assert!(!settings.exists());
}

#[test]
fn test_list_flags_stale_entries() {
    let dir = project();
    let settings = dir.path().join("settings.toml");

    cli(&settings, dir.path()).arg("build").assert().success();
    std::fs::remove_file(dir.path().join("AssetBundles/chair/source.unity3d")).unwrap();

    cli(&settings, dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "chair, Version: 1, Contents: 1, Size: - (stale: bundle file missing)",
        ));
}

#[test]
fn test_list_empty_export_folder() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("settings.toml");

    cli(&settings, dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No bundles recorded"));
}

#[test]
fn test_reset_restores_defaults() {
    let dir = project();
    let settings = dir.path().join("settings.toml");
    std::fs::write(&settings, "bundle_extension = \".bundle\"\nstrip_variant = true\n").unwrap();

    cli(&settings, dir.path())
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Settings reset to defaults"));

    let text = std::fs::read_to_string(&settings).unwrap();
    assert!(text.contains("bundle_extension = \".unity3d\""), "{text}");
    assert!(text.contains("strip_variant = false"), "{text}");
}

#[test]
fn test_reserved_name_fails_with_stage() {
    let dir = project();
    std::fs::write(
        dir.path().join("Assets/AssetBundles/source/source.prefab"),
        b"clash",
    )
    .unwrap();
    let settings = dir.path().join("settings.toml");

    cli(&settings, dir.path())
        .arg("build")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: staging failed"));

    assert!(!settings.exists());
}

#[cfg(unix)]
#[test]
fn test_external_packager_failure_exits_non_zero() {
    let dir = project();
    let settings = dir.path().join("settings.toml");

    cli(&settings, dir.path())
        .args(["build", "--packager", "false", "--packager-retries", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("packaging failed"));
}

#[test]
fn test_invalid_extension_is_rejected() {
    let dir = project();
    let settings = dir.path().join("settings.toml");

    cli(&settings, dir.path())
        .args(["build", "--extension", "."])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--extension cannot be empty"));
}
