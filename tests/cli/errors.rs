//! Error reporting and exit codes.

use predicates::prelude::*;

use crate::support::*;

#[test]
fn test_missing_store_suggests_init() {
    let t = Test::new();

    let output = t.get("anything");
    assert_failure(&output);
    assert_eq!(output.status.code(), Some(1));
    assert_stderr_contains(&output, "path not found in storage");
    assert_stderr_contains(&output, "run: stowage init");
}

#[test]
fn test_missing_identity() {
    skip_without_git!();
    let t = Test::with_secrets(&[("svc", "v")]);
    std::fs::remove_dir_all(t.identities_dir()).unwrap();

    let output = t.get("svc");
    assert_failure(&output);
    assert_stderr_contains(&output, "no available identities found");
    assert_stderr_contains(&output, "add your recipient");

    // writing needs no identity
    assert_success(&t.add("other", "x"));
}

#[test]
fn test_foreign_recipient_only() {
    skip_without_git!();
    let t = Test::new();
    assert_success(&t.init_cmd(&["-r", BOB_PUBLIC_KEY]));
    assert_success(&t.add("svc", "v"));

    let output = t.get("svc");
    assert_failure(&output);
    assert_stderr_contains(&output, "no available identities found");
}

#[test]
fn test_invalid_settings() {
    let t = Test::new();
    std::fs::write(t.home.path().join("config.toml"), "concurrency = 0\n").unwrap();

    let output = t.stowage(&["ls"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "concurrency");

    std::fs::write(t.home.path().join("config.toml"), "concurrency = [\n").unwrap();
    assert_failure(&t.stowage(&["ls"]));
}

#[test]
fn test_settings_relocate_store() {
    skip_without_git!();
    let t = Test::new();
    let custom = t.home.path().join("stores").join("main");
    std::fs::write(
        t.home.path().join("config.toml"),
        format!("store = {:?}\nconcurrency = 4\n", custom.to_str().unwrap()),
    )
    .unwrap();

    assert_success(&t.init_cmd(&[]));
    assert!(custom.join(".stowage.json").exists());
    assert!(!t.store_dir().exists());

    assert_success(&t.add("k", "v"));
    assert_success(&t.stowage(&["unpack"]));
    assert_success(&t.stowage(&["pack"]));
    assert_eq!(stdout(&t.get("k")), "v\n");
}

#[test]
fn test_unknown_command() {
    let t = Test::new();
    let output = t.stowage(&["frobnicate"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "unrecognized subcommand");
}

#[test]
fn test_help_lists_commands() {
    let t = Test::new();
    t.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("unpack"))
        .stdout(predicate::str::contains("rollback"))
        .stdout(predicate::str::contains("--store"));
}

#[test]
fn test_operations_on_missing_secret() {
    skip_without_git!();
    let t = Test::init();

    t.cmd()
        .args(["mv", "ghost", "elsewhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("secret not found: ghost"));
    t.cmd()
        .args(["rm", "ghost", "--key", "k"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("secret not found"));
    t.cmd()
        .args(["mv", "a", "a/b"])
        .assert()
        .failure();
}
