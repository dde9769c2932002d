//! Tests for `stowage init` and `stowage clone`.

use std::process::Command;

use crate::support::*;

#[test]
fn test_init_generates_identity() {
    skip_without_git!();
    let t = Test::new();

    let output = t.init_cmd(&[]);
    assert_success(&output);
    assert_stdout_contains(&output, "initialized store");
    assert_stdout_contains(&output, "recipient:");

    let keys: Vec<_> = std::fs::read_dir(t.identities_dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(keys.len(), 1);
    assert!(keys[0].starts_with("age1") && keys[0].ends_with(".key"));

    assert!(t.store_dir().join(".stowage.json").exists());
    assert_eq!(git_log(&t.store_dir()), vec!["Initialized store".to_string()]);
}

#[test]
fn test_init_with_recipient_saves_no_identity() {
    skip_without_git!();
    let t = Test::new();

    let output = t.init_cmd(&["-r", BOB_PUBLIC_KEY]);
    assert_success(&output);
    assert!(!t.identities_dir().exists());

    let manifest = std::fs::read_to_string(t.store_dir().join(".stowage.json")).unwrap();
    assert!(manifest.contains(BOB_PUBLIC_KEY));
    assert!(manifest.contains(r#""kind": "store""#));
}

#[test]
fn test_init_rejects_invalid_recipient() {
    let t = Test::new();

    let output = t.init_cmd(&["--recipient", INVALID_PUBLIC_KEY]);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid recipient");
    assert!(!t.store_dir().exists());
}

#[test]
fn test_init_twice_fails() {
    skip_without_git!();
    let t = Test::init();

    let output = t.init_cmd(&[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "already exists");
}

#[test]
fn test_init_at_custom_location() {
    skip_without_git!();
    let t = Test::new();
    let custom = t.home.path().join("elsewhere");

    let output = t
        .cmd()
        .args(["--store", custom.to_str().unwrap(), "init"])
        .output()
        .unwrap();
    assert_success(&output);
    assert!(custom.join(".stowage.json").exists());
    assert!(!t.store_dir().exists());

    let output = t
        .cmd()
        .env("STOWAGE_STORE", &custom)
        .args(["add", "k", "v"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_eq!(git_log(&custom)[0], "Add k");
}

#[test]
fn test_clone_from_remote() {
    skip_without_git!();
    let remotes = tempfile::TempDir::new().unwrap();
    let remote = remotes.path().join("store.git");
    let status = Command::new("git")
        .args(["init", "-q", "--bare"])
        .arg(&remote)
        .status()
        .unwrap();
    assert!(status.success());
    let remote = remote.to_str().unwrap();

    let alice = Test::new();
    assert_success(&alice.init_cmd(&["--remote", remote]));
    assert_success(&alice.add("shared/token", "abc"));
    assert_success(&alice.stowage(&["sync"]));

    let bob = Test::new();
    let output = bob.stowage(&["clone", remote]);
    assert_success(&output);
    assert_stdout_contains(&output, "cloned store");
    assert_stderr_contains(&output, "no identity in the keyring");
    assert_eq!(bob.paths(), vec!["shared/token".to_string()]);

    // hand bob alice's identity
    std::fs::create_dir_all(bob.identities_dir()).unwrap();
    for entry in std::fs::read_dir(alice.identities_dir()).unwrap() {
        let entry = entry.unwrap();
        std::fs::copy(entry.path(), bob.identities_dir().join(entry.file_name())).unwrap();
    }
    let output = bob.get("shared/token");
    assert_success(&output);
    assert_eq!(stdout(&output), "abc\n");
}
