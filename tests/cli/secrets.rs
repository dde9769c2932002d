//! Tests for add, get, rm, cp, mv and ls.

use crate::support::*;

#[test]
fn test_add_and_get() {
    skip_without_git!();
    let t = Test::init();

    let output = t.add("apps/api/token", "sk-test-12345");
    assert_success(&output);
    assert_stdout_contains(&output, "added apps/api/token");

    let output = t.get("apps/api/token");
    assert_success(&output);
    assert_eq!(stdout(&output), "sk-test-12345\n");

    assert_eq!(git_log(&t.store_dir())[0], "Add apps/api/token");
}

#[test]
fn test_fields() {
    skip_without_git!();
    let t = Test::init();
    assert_success(&t.add_field("db", "user", "admin"));
    assert_success(&t.add_field("db", "pass", "hunter2"));

    let output = t.get("db");
    assert_success(&output);
    assert_eq!(stdout(&output), "pass: hunter2\nuser: admin\n");

    let output = t.stowage(&["get", "db", "--key", "user"]);
    assert_eq!(stdout(&output), "admin\n");

    let output = t.stowage(&["get", "db", "--key", "host"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "field 'host' not found");

    assert_success(&t.stowage(&["rm", "db", "-k", "pass"]));
    assert_eq!(stdout(&t.get("db")), "admin\n");
    assert_eq!(git_log(&t.store_dir())[0], "Remove db at pass");
}

#[test]
fn test_add_from_stdin() {
    skip_without_git!();
    let t = Test::init();

    let output = t
        .cmd()
        .args(["add", "piped"])
        .write_stdin("line one\nline two\n")
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(stdout(&t.get("piped")), "line one\nline two\n");
}

#[test]
fn test_get_missing_secret_warns() {
    skip_without_git!();
    let t = Test::init();

    let output = t.get("nothing/here");
    assert_success(&output);
    assert_stderr_contains(&output, "no secret at nothing/here");
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_rm() {
    skip_without_git!();
    let t = Test::with_secrets(STANDARD_SECRETS);

    assert_success(&t.rm("apps/db"));
    assert_eq!(
        t.paths(),
        vec!["apps/api/token".to_string(), "root".to_string()]
    );

    let output = t.rm("apps/db");
    assert_failure(&output);
    assert_stderr_contains(&output, "secret not found: apps/db");
}

#[test]
fn test_cp_and_mv() {
    skip_without_git!();
    let t = Test::with_secrets(STANDARD_SECRETS);

    assert_success(&t.stowage(&["cp", "apps/db", "backup/db"]));
    assert_success(&t.stowage(&["mv", "root", "apps/root"]));

    assert_eq!(
        t.paths(),
        vec![
            "apps/api/token".to_string(),
            "apps/db/password".to_string(),
            "apps/db/replica".to_string(),
            "apps/root".to_string(),
            "backup/db/password".to_string(),
            "backup/db/replica".to_string(),
        ]
    );
    assert_eq!(stdout(&t.get("backup/db/password")), "hunter2\n");

    let log = git_log(&t.store_dir());
    assert_eq!(log[0], "Move root to apps/root");
    assert_eq!(log[1], "Copy apps/db to backup/db");
}

#[test]
fn test_ls_text_and_subtree() {
    skip_without_git!();
    let t = Test::with_secrets(STANDARD_SECRETS);

    let output = t.stowage(&["ls"]);
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("apps/"));
    assert!(out.contains("token"));
    assert!(!out.contains(".stowage.json"));

    let output = t.stowage(&["ls", "apps/db", "--json"]);
    assert_success(&output);
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["paths"], serde_json::json!(["password", "replica"]));
}

#[test]
fn test_ls_empty_store() {
    skip_without_git!();
    let t = Test::init();

    let output = t.stowage(&["ls"]);
    assert_success(&output);
    assert_stdout_contains(&output, "no secrets stored");
    assert!(t.paths().is_empty());
}

#[test]
fn test_internal_paths_rejected() {
    skip_without_git!();
    let t = Test::init();

    for path in FORBIDDEN_PATHS {
        let output = t.add(path, "x");
        assert_failure(&output);
    }
    assert_stderr_contains(&t.add(".git/config", "x"), "store internal objects");
    assert_stderr_contains(&t.add("../escape", "x"), "not local");

    assert!(t.paths().is_empty());
    assert_eq!(git_log(&t.store_dir()).len(), 1);
}
