//! CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;

fn live_ask() -> Command {
    let mut cmd = Command::cargo_bin("live-ask").unwrap();
    // Keep host configuration out of the tests.
    cmd.env_remove("LIVE_ASK_API_URL")
        .env_remove("LIVE_ASK_API_KEY")
        .env_remove("LIVE_ASK_TOKEN");
    cmd
}

#[test]
fn help_output() {
    live_ask()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--engine-cmd"))
        .stdout(predicate::str::contains("--stdin"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn version_output() {
    live_ask()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("live-ask"));
}

#[test]
fn config_help() {
    live_ask()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("set"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("path"));
}

#[test]
fn config_path_command() {
    let dir = tempfile::tempdir().unwrap();
    live_ask()
        .args(["config", "path"])
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("live-ask"))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn config_init_then_set_and_get() {
    let dir = tempfile::tempdir().unwrap();

    live_ask()
        .args(["config", "init"])
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .success();

    live_ask()
        .args(["config", "set", "api_url", "https://api.example.com"])
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .success();

    live_ask()
        .args(["config", "get", "api_url"])
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("https://api.example.com"));
}

#[test]
fn config_set_engine_command() {
    let dir = tempfile::tempdir().unwrap();

    live_ask()
        .args(["config", "set", "engine.command", "stt-stream --rate 16000"])
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .success();

    live_ask()
        .args(["config", "get", "engine.command"])
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("stt-stream --rate 16000"));
}

#[test]
fn config_get_unset_key() {
    let dir = tempfile::tempdir().unwrap();
    live_ask()
        .args(["config", "get", "token"])
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("(not set)"));
}

#[test]
fn config_secrets_are_masked() {
    let dir = tempfile::tempdir().unwrap();

    live_ask()
        .args(["config", "set", "api_key", "abcdefghijklmnop"])
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .success();

    live_ask()
        .args(["config", "get", "api_key"])
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("abcd...mnop"))
        .stdout(predicate::str::contains("abcdefghijklmnop").not());
}

#[test]
fn config_list_shows_all_keys() {
    let dir = tempfile::tempdir().unwrap();
    live_ask()
        .args(["config", "list"])
        .env("XDG_CONFIG_HOME", dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("api_url"))
        .stdout(predicate::str::contains("api_key"))
        .stdout(predicate::str::contains("token"))
        .stdout(predicate::str::contains("dispatch_timeout"))
        .stdout(predicate::str::contains("engine.command"));
}
