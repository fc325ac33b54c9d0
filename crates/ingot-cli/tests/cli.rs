//! CLI surface tests for the `ingot` binary.
use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("ingot")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("link"))
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("clean"));
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("ingot")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ingot"));
}

#[test]
fn test_link_requires_classpath() {
    Command::cargo_bin("ingot")
        .unwrap()
        .args(["link", "--main", "app.Main", "--ir-driver", "ingot-ir"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--classpath"));
}

#[test]
fn test_link_rejects_unknown_gc() {
    Command::cargo_bin("ingot")
        .unwrap()
        .args([
            "link",
            "--classpath",
            "app.jar",
            "--main",
            "app.Main",
            "--ir-driver",
            "ingot-ir",
            "--gc",
            "cheney",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown garbage collector"));
}

#[test]
fn test_clean_removes_workdir() {
    let tmp = tempfile::TempDir::new().unwrap();
    let workdir = tmp.path().join("native");
    std::fs::create_dir_all(workdir.join("lib")).unwrap();
    std::fs::write(workdir.join("out"), b"stale").unwrap();

    Command::cargo_bin("ingot")
        .unwrap()
        .args(["clean", "--workdir"])
        .arg(&workdir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));
    assert!(!workdir.exists());
}

#[test]
fn test_clean_missing_workdir_is_ok() {
    let tmp = tempfile::TempDir::new().unwrap();
    Command::cargo_bin("ingot")
        .unwrap()
        .args(["clean", "--workdir"])
        .arg(tmp.path().join("absent"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to clean"));
}
