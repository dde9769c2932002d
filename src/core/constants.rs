//! Constants used throughout stowage.
//!
//! Centralizes magic strings and configuration values.

/// Manifest location inside every store.
pub const MANIFEST_PATH: &str = ".stowage.json";

/// Storage-internal names that secret paths may never touch.
pub const RESERVED_PATHS: &[&str] = &[MANIFEST_PATH, ".gitignore", ".git"];

/// Field name used when no explicit key is given.
pub const DEFAULT_FIELD: &str = "data";

/// Discriminator written into serialized manifests.
pub const STORE_KIND: &str = "store";

/// Discriminator written into serialized secrets.
pub const SECRET_KIND: &str = "secret";

/// Default width of the pack/unpack worker pool.
pub const DEFAULT_CONCURRENCY: usize = 50;

/// Remote name used by the git backend.
pub const REMOTE_NAME: &str = "origin";

/// Commit message written when a store is created.
pub const INIT_MESSAGE: &str = "Initialized store";

/// Home directory relative to the user's home (~/.stowage).
pub const HOME_DIR: &str = ".stowage";

/// Settings file name inside the stowage home.
pub const SETTINGS_FILE: &str = "config.toml";

/// Keyring directory name inside the stowage home.
pub const IDENTITIES_DIR: &str = "identities";

/// Default store directory name inside the stowage home.
pub const STORE_DIR: &str = "store";
