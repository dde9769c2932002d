//! Test fixtures and constants.

use std::sync::Arc;

use stowage::core::cipher::{Age, EncryptionType, Identity};
use stowage::core::constants::MANIFEST_PATH;
use stowage::core::domain::Manifest;
use stowage::core::identity::StaticIdentities;
use stowage::core::storage::{MemoryStorage, Storage, StorageType};
use stowage::core::store::Store;

/// A valid age public key nobody in the tests holds.
pub const BOB_PUBLIC_KEY: &str = "age1ql3z7hjy54pw3hyww5ayyfg7zqgvc7w3j2elw8zmrj2kg5sfn9aqmcac8p";

/// An invalid public key for negative tests.
pub const INVALID_PUBLIC_KEY: &str = "not-a-valid-age-key";

/// Secrets used across multiple tests.
pub const STANDARD_SECRETS: &[(&str, &str)] = &[
    ("apps/api/token", "sk-test-12345"),
    ("apps/db/password", "hunter2"),
    ("apps/db/replica", "postgres://replica"),
    ("root", "root-secret"),
];

/// Paths that must never reach storage.
pub const FORBIDDEN_PATHS: &[&str] = &[
    ".stowage.json",
    ".git",
    ".git/config",
    ".gitignore",
    "../escape",
    "a/../../b",
    "/etc/passwd",
];

/// A committed in-memory store and the identity that can read it.
pub fn memory_store() -> (Store<MemoryStorage>, Identity) {
    let identity = Age.generate_identity();
    let storage = memory_storage(&[identity.recipient().clone()]);
    let identities = Arc::new(StaticIdentities::new(vec![identity.clone()]));
    let store = Store::load(storage, identities).expect("failed to load memory store");
    (store, identity)
}

/// Memory storage holding only a committed manifest.
pub fn memory_storage(recipients: &[stowage::core::cipher::Recipient]) -> MemoryStorage {
    let manifest = Manifest::new(StorageType::Git, EncryptionType::Age, recipients.to_vec())
        .expect("failed to build manifest");
    let storage = MemoryStorage::new();
    storage
        .store(MANIFEST_PATH, &manifest.to_json().expect("manifest json"))
        .expect("failed to store manifest");
    storage.commit("Initialized store").expect("failed to commit");
    storage
}

/// Plaintext of every field as `(name, value)`.
pub fn plain(store: &Store<MemoryStorage>, path: &str) -> Vec<(String, String)> {
    store
        .get(path, None)
        .expect("get failed")
        .into_iter()
        .map(|d| (d.name, String::from_utf8_lossy(&d.payload).to_string()))
        .collect()
}
