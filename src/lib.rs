//! Stowage - a version-controlled, multi-recipient encrypted secret store.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── store         # init, clone, store location
//! │   ├── secrets       # add, get, rm, cp, mv, ls
//! │   └── pack          # pack, unpack, sync, rollback
//! └── core/             # Core library components
//!     ├── config        # ~/.stowage/config.toml settings
//!     ├── domain/       # Manifest, secrets, operation log
//!     ├── cipher/       # Encryption contract and age backend
//!     ├── identity/     # Identity providers (keyring, static)
//!     ├── storage/      # Versioned storage contract, git and memory backends
//!     ├── store/        # The engine: CRUD, pack/unpack, lifecycle
//!     ├── pool          # Bounded worker pool
//!     ├── cancel        # Cooperative cancellation
//!     └── progress      # Progress sinks
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use stowage::core::config::Settings;
//! use stowage::core::identity::Keyring;
//! use stowage::core::store::Store;
//!
//! # fn main() -> stowage::error::Result<()> {
//! let settings = Settings::load()?;
//! let keyring = Arc::new(Keyring::new(&settings.identities));
//! let mut store = Store::open(&settings.store, keyring, &settings)?;
//!
//! store.session(|s| s.add("db/password", None, b"hunter2"))?;
//! let fields = store.get("db/password", None)?;
//! assert_eq!(fields[0].payload.as_slice(), b"hunter2");
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod error;
