//! Command-line behavior tests

use assert_cmd::Command;
use predicates::prelude::*;

fn javafmt() -> Command {
    Command::cargo_bin("javafmt").unwrap()
}

#[test]
fn fmt_stdout_prints_formatted_source() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Test.java");
    std::fs::write(&file, "public  class Test\n{\n}").unwrap();
    let config = dir.path().join("java-format.json");
    std::fs::write(&config, r#"{"brace_style": "attach"}"#).unwrap();

    javafmt()
        .args(["fmt", "--stdout", "--config"])
        .arg(&config)
        .arg(&file)
        .assert()
        .success()
        .stdout("public class Test {\n}");
}

#[test]
fn fmt_rewrites_the_file_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Test.java");
    std::fs::write(&file, "class account {\n}").unwrap();

    javafmt().arg("fmt").arg(&file).assert().success();
    let written = std::fs::read_to_string(&file).unwrap();
    assert_eq!(written, "class Account\n{\n}");
}

#[test]
fn check_mode_fails_when_changes_are_needed() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Test.java");
    let source = "public  class Test\n{\n}";
    std::fs::write(&file, source).unwrap();

    javafmt()
        .args(["fmt", "--check"])
        .arg(&file)
        .assert()
        .failure()
        .stdout(predicate::str::contains("would reformat"));
    // Check mode never writes
    assert_eq!(std::fs::read_to_string(&file).unwrap(), source);
}

#[test]
fn check_mode_passes_on_formatted_input() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Test.java");
    std::fs::write(&file, "public class Test\n{\n}").unwrap();

    javafmt().args(["fmt", "--check"]).arg(&file).assert().success();
}

#[test]
fn audit_lists_violations_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Test.java");
    std::fs::write(&file, "class account {\n}").unwrap();

    javafmt()
        .arg("audit")
        .arg(&file)
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Class name 'account' does not match the naming convention 'pascalcase'",
        ));
}

#[test]
fn audit_passes_on_clean_files() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Test.java");
    std::fs::write(&file, "class Account {\n}").unwrap();

    javafmt().arg("audit").arg(&file).assert().success();
}

#[test]
fn config_is_discovered_from_the_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Test.java");
    std::fs::write(&file, "public  class Test\n{\n}").unwrap();
    std::fs::write(
        dir.path().join("java-format.json"),
        r#"{"brace_style": "attach"}"#,
    )
    .unwrap();

    javafmt()
        .current_dir(dir.path())
        .args(["fmt", "--stdout", "Test.java"])
        .assert()
        .success()
        .stdout("public class Test {\n}");
}

#[test]
fn missing_file_reports_an_error_exit() {
    javafmt()
        .args(["fmt", "/nonexistent/Absent.java"])
        .assert()
        .code(2);
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("Test.java");
    std::fs::write(&file, "class Account {\n}").unwrap();
    let config = dir.path().join("bad.json");
    std::fs::write(&config, "{not json").unwrap();

    javafmt()
        .args(["fmt", "--config"])
        .arg(&config)
        .arg(&file)
        .assert()
        .code(2);
}
