mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;

fn script(input: &str) -> assert_cmd::assert::Assert {
    let config_dir = common::temp_dir();
    let mut cmd = Command::cargo_bin("ecm_admin_cli").unwrap();
    cmd.env("ECM_ADMIN_CLI_SCRIPT", "1")
        .env("ECM_ADMIN_CONFIG_DIR", &config_dir)
        .env("NO_COLOR", "1")
        .env_remove("ECM_ADMIN_API_URL")
        .write_stdin(input.to_string())
        .assert()
}

#[test]
fn help_lists_commands() {
    script("help\nexit\n")
        .success()
        .stdout(contains("Available commands"))
        .stdout(contains("open"));
}

#[test]
fn validation_errors_are_printed() {
    script("open student\nset email not-an-email\nvalidate\nexit\n")
        .success()
        .stdout(contains("Opened form `student:new`"))
        .stdout(contains("Email is invalid"))
        .stdout(contains("Name is required"));
}

#[test]
fn unknown_command_suggests_closest() {
    script("valdate\nexit\n")
        .success()
        .stdout(contains("Unknown command `valdate`"))
        .stdout(contains("Suggestion: `validate`?"));
}

#[test]
fn form_commands_need_an_open_form() {
    script("set name Lan\nexit\n")
        .success()
        .stdout(contains("Try `open student` to get started."));
}

#[test]
fn unreachable_backend_keeps_the_form() {
    let input = "\
config set api_url http://127.0.0.1:9/api/v1
config set timeout 2
open teacher
set name \"Hoa Tran\"
set email hoa@example.com
set phone_number 0987654321
submit
show
exit
";
    script(input)
        .success()
        .stdout(contains("Submission rejected"))
        .stdout(contains("Hoa Tran"))
        .stdout(contains("Saved").not());
}

#[test]
fn config_set_persists_to_config_dir() {
    let config_dir = common::temp_dir();
    Command::cargo_bin("ecm_admin_cli")
        .unwrap()
        .env("ECM_ADMIN_CLI_SCRIPT", "1")
        .env("ECM_ADMIN_CONFIG_DIR", &config_dir)
        .env("NO_COLOR", "1")
        .write_stdin("config set timeout 12\nexit\n")
        .assert()
        .success()
        .stdout(contains("Configuration updated."));

    let json = std::fs::read_to_string(config_dir.join("config.json")).unwrap();
    assert!(json.contains("\"request_timeout_secs\": 12"));
}

#[test]
fn show_prints_field_help() {
    script("open student\nshow\nexit\n")
        .success()
        .stdout(contains("(YYYY-MM-DD)"))
        .stdout(contains("(Leave blank to let the server generate one)"));
}
