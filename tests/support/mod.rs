//! Test support utilities for stowage integration tests.
//!
//! Provides reusable test environment setup and helper commands.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;
#[macro_use]
pub mod skip;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with an isolated stowage home.
///
/// The store lives at `<home>/store`, the keyring at `<home>/identities`.
/// No process-global state is mutated; child processes receive their
/// environment explicitly so tests can run in parallel.
pub struct Test {
    /// Temporary stowage home (`STOWAGE_HOME`)
    pub home: TempDir,
}

impl Test {
    /// Create a new empty test environment.
    pub fn new() -> Self {
        let home = TempDir::new().expect("failed to create temp home");
        Self { home }
    }

    /// Create a test environment with a store initialized.
    pub fn init() -> Self {
        let t = Self::new();
        let output = t.init_cmd(&[]);
        assert!(
            output.status.success(),
            "Failed to initialize store: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        t
    }

    /// Create a test environment with a store holding the given secrets.
    pub fn with_secrets(secrets: &[(&str, &str)]) -> Self {
        let t = Self::init();
        for (path, value) in secrets {
            let output = t.add(path, value);
            assert!(
                output.status.success(),
                "Failed to add secret {}: {}",
                path,
                String::from_utf8_lossy(&output.stderr)
            );
        }
        t
    }

    pub fn store_dir(&self) -> PathBuf {
        self.home.path().join("store")
    }

    pub fn identities_dir(&self) -> PathBuf {
        self.home.path().join("identities")
    }
}
