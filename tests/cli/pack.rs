//! Tests for unpack, pack, rollback and sync.

use crate::support::*;

#[test]
fn test_unpack_edit_pack() {
    skip_without_git!();
    let t = Test::with_secrets(STANDARD_SECRETS);
    let store = t.store_dir();
    let untouched = std::fs::read(store.join("apps/db/replica")).unwrap();

    let output = t.stowage(&["unpack"]);
    assert_success(&output);
    assert_stdout_contains(&output, "unpacked into");
    assert_eq!(
        std::fs::read_to_string(store.join("apps/db/password")).unwrap(),
        "hunter2"
    );
    // unpacking is never committed
    assert_eq!(git_log(&store)[0], "Add root");

    std::fs::write(store.join("apps/db/password"), "correct horse").unwrap();
    std::fs::write(store.join("apps/new"), "brand new").unwrap();

    let output = t.stowage(&["pack"]);
    assert_success(&output);
    assert_stdout_contains(&output, "packed");
    assert_eq!(git_log(&store)[0], "Pack store");

    assert_eq!(stdout(&t.get("apps/db/password")), "correct horse\n");
    assert_eq!(stdout(&t.get("apps/new")), "brand new\n");
    assert_eq!(std::fs::read(store.join("apps/db/replica")).unwrap(), untouched);
}

#[test]
fn test_modifications_blocked_while_unpacked() {
    skip_without_git!();
    let t = Test::with_secrets(&[("svc", "v")]);
    assert_success(&t.stowage(&["unpack"]));

    let output = t.add("other", "x");
    assert_failure(&output);
    assert_stderr_contains(&output, "store is unpacked");
    assert_stderr_contains(&output, "run: stowage pack");

    let output = t.get("svc");
    assert_failure(&output);

    let output = t.stowage(&["unpack"]);
    assert_failure(&output);

    // listing still works
    assert_eq!(t.paths(), vec!["svc".to_string()]);
}

#[test]
fn test_pack_requires_unpacked() {
    skip_without_git!();
    let t = Test::init();

    let output = t.stowage(&["pack"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "store is packed");
    assert_stderr_contains(&output, "run: stowage unpack");
}

#[test]
fn test_skip_changes_check_rewrites_ciphertext() {
    skip_without_git!();
    let t = Test::with_secrets(&[("svc", "v")]);
    let before = std::fs::read(t.store_dir().join("svc")).unwrap();

    assert_success(&t.stowage(&["unpack"]));
    assert_success(&t.stowage(&["pack", "--skip-changes-check"]));

    assert_ne!(std::fs::read(t.store_dir().join("svc")).unwrap(), before);
    assert_eq!(stdout(&t.get("svc")), "v\n");
    assert_eq!(git_log(&t.store_dir())[0], "Pack store");
}

#[test]
fn test_rollback_restores_packed_store() {
    skip_without_git!();
    let t = Test::with_secrets(&[("svc", "v")]);
    assert_success(&t.stowage(&["unpack"]));
    std::fs::write(t.store_dir().join("svc"), "edited").unwrap();

    let output = t.stowage(&["rollback"]);
    assert_success(&output);
    assert_stdout_contains(&output, "discarded");

    assert_eq!(stdout(&t.get("svc")), "v\n");
    assert_success(&t.add("svc", "w"));
}

#[test]
fn test_sync_without_remote_fails() {
    skip_without_git!();
    let t = Test::init();

    let output = t.stowage(&["sync"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "storage has no remote");
}
