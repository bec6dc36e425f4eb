//! Binary-level behaviour: argument handling and exit codes.
//!
//! None of these tests need ffmpeg, ffprobe or ImageMagick: trees either hold
//! no media at all or the configured tool paths point nowhere.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn mediacanon() -> Command {
    let mut cmd = Command::cargo_bin("mediacanon").unwrap();
    cmd.env_remove("RUST_LOG").arg("--no-color");
    cmd
}

fn bogus_tools_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("mediacanon.toml");
    fs::write(
        &path,
        r#"
[tools]
ffmpeg_path = "/nonexistent/ffmpeg"
ffprobe_path = "/nonexistent/ffprobe"
magick_path = "/nonexistent/magick"
"#,
    )
    .unwrap();
    path
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = TempDir::new().unwrap();
    mediacanon()
        .arg("--root")
        .arg(dir.path().join("does-not-exist"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Root directory not found"));
}

#[test]
fn test_conflicting_modes_are_a_usage_error() {
    mediacanon()
        .args(["--apply", "--check"])
        .assert()
        .code(1);
}

#[test]
fn test_empty_tree_check_succeeds() {
    let site = TempDir::new().unwrap();
    mediacanon()
        .arg("--root")
        .arg(site.path())
        .arg("--check")
        .assert()
        .success();
}

#[test]
fn test_html_only_tree_apply_succeeds() {
    let site = TempDir::new().unwrap();
    fs::write(site.path().join("index.html"), "<p>hello</p>").unwrap();
    mediacanon()
        .arg("--root")
        .arg(site.path())
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(site.path().join("index.html")).unwrap(),
        "<p>hello</p>"
    );
}

#[test]
fn test_check_reports_pending_images_without_tools() {
    let site = TempDir::new().unwrap();
    let conf = TempDir::new().unwrap();
    fs::write(site.path().join("photo.jpg"), b"jpeg").unwrap();

    mediacanon()
        .arg("--root")
        .arg(site.path())
        .arg("--check")
        .arg("--config")
        .arg(bogus_tools_config(conf.path()))
        .assert()
        .code(2)
        .stdout(predicate::str::contains("1 file(s) need conversion"));

    assert!(site.path().join("photo.jpg").exists());
    assert!(!site.path().join("photo.png").exists());
}

#[test]
fn test_apply_with_missing_converter_is_fatal() {
    let site = TempDir::new().unwrap();
    let conf = TempDir::new().unwrap();
    fs::write(site.path().join("photo.jpg"), b"jpeg").unwrap();

    mediacanon()
        .arg("--root")
        .arg(site.path())
        .arg("--config")
        .arg(bogus_tools_config(conf.path()))
        .assert()
        .code(1);

    assert_eq!(fs::read(site.path().join("photo.jpg")).unwrap(), b"jpeg");
    assert!(!site.path().join("photo.png").exists());
}

#[test]
fn test_missing_prober_is_fatal_when_media_exists() {
    let site = TempDir::new().unwrap();
    let conf = TempDir::new().unwrap();
    fs::write(site.path().join("song.mp3"), b"id3").unwrap();

    mediacanon()
        .arg("--root")
        .arg(site.path())
        .arg("--check")
        .arg("--config")
        .arg(bogus_tools_config(conf.path()))
        .assert()
        .code(1);
}

#[test]
fn test_missing_config_file_is_fatal() {
    let site = TempDir::new().unwrap();
    mediacanon()
        .arg("--root")
        .arg(site.path())
        .arg("--config")
        .arg(site.path().join("absent.toml"))
        .assert()
        .code(1);
}

#[test]
fn test_invalid_quality_is_rejected() {
    let site = TempDir::new().unwrap();
    let conf = TempDir::new().unwrap();
    let path = conf.path().join("mediacanon.toml");
    fs::write(&path, "[encoding]\nvideo_quality = 42\n").unwrap();

    mediacanon()
        .arg("--root")
        .arg(site.path())
        .arg("--config")
        .arg(&path)
        .assert()
        .code(1);
}

#[test]
fn test_environment_overrides_tool_paths() {
    let site = TempDir::new().unwrap();
    fs::write(site.path().join("photo.jpg"), b"jpeg").unwrap();

    mediacanon()
        .env("MEDIACANON_TOOLS__MAGICK_PATH", "/nonexistent/magick")
        .arg("--root")
        .arg(site.path())
        .assert()
        .code(1);

    assert_eq!(fs::read(site.path().join("photo.jpg")).unwrap(), b"jpeg");
    assert!(!site.path().join("photo.png").exists());
}
