use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("toco")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("register"))
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("done"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_list_help_shows_filters() {
    cargo_bin_cmd!("toco")
        .args(["list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--active"))
        .stdout(predicate::str::contains("--completed"));
}

#[test]
fn test_list_filters_conflict() {
    cargo_bin_cmd!("toco")
        .args(["list", "--active", "--completed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_config_help_shows_subcommands() {
    cargo_bin_cmd!("toco")
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("path"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("set-url"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("toco")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.3"));
}
