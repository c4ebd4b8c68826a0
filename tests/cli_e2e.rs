//! End-to-end CLI tests for the content-delivery binary.

// `Command::cargo_bin` is deprecated in assert_cmd >=2.0.17 in favor of
// `cargo::cargo_bin_cmd!` macro. Suppressed until migration to the new API.
#![allow(deprecated)]

mod support;

use assert_cmd::Command;
use predicates::prelude::*;
use support::fixtures::{PROJECT_ID, actor, item_response, movie};
use support::socket_guard::start_mock_server_or_skip;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn write_config(config_home: &std::path::Path, contents: &str) -> std::path::PathBuf {
    let config_dir = config_home.join("content-delivery");
    std::fs::create_dir_all(&config_dir).unwrap();
    let path = config_dir.join("config.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

/// Binary with the user config directory pointed at an empty temp dir.
fn isolated_cmd(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("content-delivery").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("content-delivery").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Query a headless content-delivery project"));
}

#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("content-delivery").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("content-delivery"));
}

#[test]
fn test_binary_requires_subcommand() {
    let mut cmd = Command::cargo_bin("content-delivery").unwrap();
    cmd.assert().failure().stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_binary_rejects_depth_out_of_range() {
    let config_home = TempDir::new().unwrap();
    isolated_cmd(&config_home)
        .args(["item", "warrior", "--depth", "11"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_missing_project_id_fails_with_suggestion() {
    let config_home = TempDir::new().unwrap();
    isolated_cmd(&config_home)
        .args(["item", "warrior"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No project id configured"))
        .stderr(predicate::str::contains("--project"));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let config_home = TempDir::new().unwrap();
    let path = write_config(config_home.path(), "depth = 99\n");
    isolated_cmd(&config_home)
        .arg("--config")
        .arg(&path)
        .args(["item", "warrior"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"))
        .stderr(predicate::str::contains("Invalid config value for `depth`"));
}

#[test]
fn test_explicit_config_file_must_exist() {
    let config_home = TempDir::new().unwrap();
    isolated_cmd(&config_home)
        .args(["--config", "does-not-exist.toml", "item", "warrior"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[tokio::test]
async fn test_item_fetch_prints_json() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path(format!("/{PROJECT_ID}/items/warrior")))
        .and(query_param("depth", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(item_response(
            movie("warrior", "Warrior", &["tom_hardy"]),
            &[actor("tom_hardy", "Tom", &["warrior"])],
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config_home = TempDir::new().unwrap();
    let mut cmd = isolated_cmd(&config_home);
    cmd.args(["--project", PROJECT_ID, "--base-url", &mock_server.uri()])
        .args(["item", "warrior", "--depth", "1"]);

    tokio::task::spawn_blocking(move || {
        cmd.assert()
            .success()
            .stdout(predicate::str::contains("\"Warrior\""))
            .stdout(predicate::str::contains("tom_hardy"));
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_project_and_base_url_from_config_file() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path(format!("/{PROJECT_ID}/items")))
        .and(query_param("system.type", "movie"))
        .and(query_param("language", "es-ES"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [movie("warrior", "Guerrero", &[])],
            "modular_content": {},
            "pagination": {"skip": 0, "limit": 1, "count": 1, "next_page": ""}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config_home = TempDir::new().unwrap();
    write_config(
        config_home.path(),
        &format!(
            "project_id = \"{PROJECT_ID}\"\nbase_url = \"{}\"\nlanguage = \"es-ES\" # default language\n",
            mock_server.uri()
        ),
    );
    let mut cmd = isolated_cmd(&config_home);
    cmd.args(["items", "--type", "movie"]);

    tokio::task::spawn_blocking(move || {
        cmd.assert()
            .success()
            .stdout(predicate::str::contains("\"Guerrero\""));
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_api_error_exits_non_zero() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };

    Mock::given(method("GET"))
        .and(path(format!("/{PROJECT_ID}/items/ghost")))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "message": "The requested content item 'ghost' was not found.",
            "request_id": "req-1",
            "error_code": 100
        })))
        .mount(&mock_server)
        .await;

    let config_home = TempDir::new().unwrap();
    let mut cmd = isolated_cmd(&config_home);
    cmd.args(["-p", PROJECT_ID, "--base-url", &mock_server.uri(), "item", "ghost"]);

    tokio::task::spawn_blocking(move || {
        cmd.assert()
            .failure()
            .stderr(predicate::str::contains("Failed to fetch item 'ghost'"));
    })
    .await
    .unwrap();
}
