//! Store engine behavior over in-memory storage.

mod support;

use std::sync::Arc;

use proptest::prelude::*;
use stowage::core::cipher::Age;
use stowage::core::identity::StaticIdentities;
use stowage::core::storage::{MemoryStorage, Storage};
use stowage::core::store::Store;
use stowage::error::{CipherError, Error, SecretError, StoreError};
use support::*;

#[test]
fn test_add_get_roundtrip() {
    let (mut store, _) = memory_store();
    for (path, value) in STANDARD_SECRETS {
        store.add(path, None, value.as_bytes()).unwrap();
    }

    for (path, value) in STANDARD_SECRETS {
        let data = store.get(path, None).unwrap();
        assert_eq!(data.len(), 1);
        assert!(data[0].default);
        assert_eq!(data[0].payload.as_slice(), value.as_bytes());
    }
}

#[test]
fn test_binary_values_roundtrip() {
    let (mut store, _) = memory_store();
    let value: Vec<u8> = (0..=255).collect();
    store.add("blob", Some("raw"), &value).unwrap();

    let data = store.get("blob", Some("raw")).unwrap();
    assert_eq!(data[0].payload.as_slice(), value.as_slice());
}

#[test]
fn test_field_isolation() {
    let (mut store, _) = memory_store();
    store.add("svc", Some("a"), b"X").unwrap();
    store.add("svc", Some("b"), b"Y").unwrap();

    assert_eq!(
        plain(&store, "svc"),
        vec![
            ("a".to_string(), "X".to_string()),
            ("b".to_string(), "Y".to_string()),
        ]
    );

    store.add("svc", Some("a"), b"Z").unwrap();
    assert_eq!(
        plain(&store, "svc"),
        vec![
            ("a".to_string(), "Z".to_string()),
            ("b".to_string(), "Y".to_string()),
        ]
    );
}

#[test]
fn test_empty_secret_is_deleted() {
    let (mut store, _) = memory_store();
    store.add("lonely", Some("only"), b"1").unwrap();
    store.add("other", None, b"2").unwrap();

    store.remove("lonely", Some("only")).unwrap();

    assert!(store.get("lonely", None).unwrap().is_empty());
    assert_eq!(store.list("").unwrap().leaf_paths(), vec!["other".to_string()]);
}

#[test]
fn test_remove_subtree() {
    let (mut store, _) = memory_store();
    for (path, value) in STANDARD_SECRETS {
        store.add(path, None, value.as_bytes()).unwrap();
    }

    store.remove("apps/db", None).unwrap();
    assert_eq!(
        store.list("").unwrap().leaf_paths(),
        vec!["apps/api/token".to_string(), "root".to_string()]
    );
}

#[test]
fn test_forbidden_paths_rejected_everywhere() {
    let (mut store, _) = memory_store();
    store.add("ok", None, b"1").unwrap();

    for path in FORBIDDEN_PATHS {
        assert!(store.add(path, None, b"x").is_err(), "add {}", path);
        assert!(store.get(path, None).is_err(), "get {}", path);
        assert!(store.remove(path, None).is_err(), "remove {}", path);
        assert!(store.copy(path, "dst").is_err(), "copy from {}", path);
        assert!(store.copy("ok", path).is_err(), "copy to {}", path);
        assert!(store.rename(path, "dst").is_err(), "move from {}", path);
        assert!(store.rename("ok", path).is_err(), "move to {}", path);
    }

    // the manifest is untouched and still loads
    assert!(store.get("ok", None).is_ok());
    assert_eq!(store.list("").unwrap().leaf_paths(), vec!["ok".to_string()]);
}

#[test]
fn test_reserved_path_error_kind() {
    let (mut store, _) = memory_store();
    let err = store.add(".stowage.json", None, b"x").unwrap_err();
    assert!(matches!(err, Error::Store(StoreError::ReservedPath(_))));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_parent_segments_never_reach_storage(
        prefix in "[a-z]{1,6}(/[a-z]{1,6}){0,2}",
        suffix in "[a-z]{1,6}",
    ) {
        let (mut store, _) = memory_store();
        let path = format!("{}/../{}", prefix, suffix);

        prop_assert!(store.add(&path, None, b"x").is_err());
        prop_assert!(store.get(&path, None).is_err());
        prop_assert!(store.remove(&path, None).is_err());
        prop_assert!(store.copy(&path, "x").is_err());
        prop_assert!(store.rename("x", &path).is_err());
        prop_assert!(store.list("").unwrap().is_empty());
    }

    #[test]
    fn prop_manifest_nested_paths_rejected(tail in "[a-z]{1,6}(/[a-z]{1,6}){0,2}") {
        let (mut store, _) = memory_store();
        for reserved in [".stowage.json", ".git"] {
            let path = format!("{}/{}", reserved, tail);
            prop_assert!(store.add(&path, None, b"x").is_err());
            prop_assert!(store.get(&path, None).is_err());
        }
    }
}

fn seed_tree(store: &mut Store<MemoryStorage>) {
    store.add("x/a", None, b"a").unwrap();
    store.add("x/b/c", None, b"c").unwrap();
    store.add("x/b/d", None, b"d").unwrap();
    store.add("y/own", None, b"own").unwrap();
}

#[test]
fn test_copy_subtree_to_new_name() {
    let (mut store, _) = memory_store();
    seed_tree(&mut store);

    store.copy("x", "z").unwrap();

    let tree = store.list("").unwrap();
    let names: Vec<&str> = tree.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["x", "y", "z"]);
    assert_eq!(store.list("z").unwrap(), store.list("x").unwrap());
    assert_eq!(plain(&store, "z/b/d"), vec![("data".to_string(), "d".to_string())]);
}

#[test]
fn test_copy_onto_itself_keeps_tree() {
    let (mut store, _) = memory_store();
    seed_tree(&mut store);
    let before = store.list("").unwrap();
    let bytes_before = store.storage().get("x/b/c").unwrap();

    store.copy("x", "x").unwrap();
    store.copy("x/b/c", "x/b/c").unwrap();
    store.rename("x/b", "x/b").unwrap();

    assert_eq!(store.list("").unwrap(), before);
    assert_eq!(store.storage().get("x/b/c").unwrap(), bytes_before);
}

#[test]
fn test_copy_into_sibling_merges() {
    let (mut store, _) = memory_store();
    seed_tree(&mut store);

    store.copy("x", "y").unwrap();

    assert_eq!(
        store.list("y").unwrap().leaf_paths(),
        vec![
            "a".to_string(),
            "b/c".to_string(),
            "b/d".to_string(),
            "own".to_string(),
        ]
    );
    // x untouched, nothing duplicated elsewhere
    assert_eq!(
        store.list("").unwrap().leaf_paths(),
        vec![
            "x/a".to_string(),
            "x/b/c".to_string(),
            "x/b/d".to_string(),
            "y/a".to_string(),
            "y/b/c".to_string(),
            "y/b/d".to_string(),
            "y/own".to_string(),
        ]
    );
}

#[test]
fn test_move_subtree() {
    let (mut store, _) = memory_store();
    seed_tree(&mut store);

    store.rename("x/b", "moved").unwrap();

    assert_eq!(
        store.list("").unwrap().leaf_paths(),
        vec![
            "moved/c".to_string(),
            "moved/d".to_string(),
            "x/a".to_string(),
            "y/own".to_string(),
        ]
    );
    assert!(store.rename("x", "x/inner").is_err());
}

#[test]
fn test_copy_missing_source() {
    let (mut store, _) = memory_store();
    let err = store.copy("ghost", "other").unwrap_err();
    assert!(matches!(err, Error::Secret(SecretError::NotFound(_))));
}

#[test]
fn test_get_without_identity_fails() {
    let identity = Age.generate_identity();
    let storage = memory_storage(&[identity.recipient().clone()]);
    let mut writer = Store::load(storage, Arc::new(StaticIdentities::empty())).unwrap();

    // encrypting needs no identity
    writer.add("svc", None, b"secret").unwrap();

    let err = writer.get("svc", None).unwrap_err();
    assert!(matches!(err, Error::Cipher(CipherError::NoIdentities)));
    assert_eq!(err.to_string(), "no available identities found");
}

#[test]
fn test_any_recipient_can_read() {
    let alice = Age.generate_identity();
    let bob = Age.generate_identity();
    let storage = memory_storage(&[alice.recipient().clone(), bob.recipient().clone()]);

    let mut store = Store::load(storage, Arc::new(StaticIdentities::new(vec![bob]))).unwrap();
    store.add("shared", None, b"both").unwrap();

    assert_eq!(plain(&store, "shared"), vec![("data".to_string(), "both".to_string())]);
}

#[test]
fn test_session_log_is_one_commit() {
    let (mut store, _) = memory_store();
    store
        .session(|s| {
            s.add("a", None, b"1")?;
            s.copy("a", "b")?;
            s.rename("b", "c")?;
            s.remove("c", None)
        })
        .unwrap();

    assert_eq!(
        store.storage().commits(),
        vec![
            "Initialized store".to_string(),
            "Add a; Copy a to b; Move b to c; Remove c".to_string(),
        ]
    );
}

#[test]
fn test_read_only_session_commits_nothing() {
    let (mut store, _) = memory_store();
    store.session(|s| s.list("").map(|_| ())).unwrap();
    assert_eq!(store.storage().commits().len(), 1);
}
