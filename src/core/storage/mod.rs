//! Versioned storage.
//!
//! Byte-addressable hierarchical storage with history: a working set that
//! the engine reads and writes, plus "latest committed" lookups, commit,
//! rollback and remote sync. The backend is selected by the
//! [`StorageType`] tag and dispatched through the closed [`Backend`] enum.
//!
//! ## Backends
//!
//! - **git**: a local git working tree driven through the `git` binary.
//! - **memory**: in-process storage for embedding and tests (not
//!   persistable, so it has no manifest tag).

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StorageError};

mod git;
mod memory;
pub mod path;
mod tree;

pub use git::GitStorage;
pub use memory::MemoryStorage;
pub use tree::{Entry, Tree};

/// Versioned-storage contract.
///
/// All paths are storage-relative; implementations reject paths that are
/// absolute or contain `..` segments.
pub trait Storage: Send + Sync {
    /// Write `data` at `path`, creating parent nodes as needed.
    fn store(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Remove a leaf or a whole subtree.
    fn remove(&self, path: &str) -> Result<()>;

    /// Copy a leaf or a whole subtree, preserving relative structure.
    /// Copying a path onto itself is a no-op.
    fn copy(&self, src: &str, dst: &str) -> Result<()>;

    /// Move a leaf or a whole subtree. Moving a path onto itself is a no-op.
    fn rename(&self, src: &str, dst: &str) -> Result<()>;

    /// Current (possibly uncommitted) content of a leaf.
    fn get(&self, path: &str) -> Result<Option<Vec<u8>>>;

    /// Content of a leaf as of the last commit; `None` without history.
    fn get_latest(&self, path: &str) -> Result<Option<Vec<u8>>>;

    /// Listing rooted at `path` (empty string for the root).
    fn list(&self, path: &str) -> Result<Tree>;

    fn add_remote(&self, name: &str, address: &str) -> Result<()>;

    fn has_remote(&self) -> Result<bool>;

    /// Push local history; nothing to push is not an error.
    fn push(&self) -> Result<()>;

    /// Pull remote history; already up to date is not an error.
    fn pull(&self) -> Result<()>;

    /// Stage and commit everything outstanding. No changes is a no-op.
    fn commit(&self, message: &str) -> Result<()>;

    /// Hard-discard uncommitted changes.
    fn rollback(&self) -> Result<()>;

    /// Backend name for display.
    fn name(&self) -> &'static str;
}

/// Storage backend tag recorded in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    #[default]
    Git,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Git => "git",
        }
    }
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StorageType {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "git" => Ok(StorageType::Git),
            other => Err(StorageError::Unsupported(other.to_string()).into()),
        }
    }
}

/// Persistable storage backend.
#[derive(Debug)]
pub enum Backend {
    Git(GitStorage),
}

impl Backend {
    /// Create a new, empty storage at `location`.
    pub fn init(location: &Path, remote: Option<&str>, kind: StorageType) -> Result<Self> {
        debug!(location = %location.display(), storage = %kind, "initializing storage");
        match kind {
            StorageType::Git => Ok(Self::Git(GitStorage::init(location, remote)?)),
        }
    }

    /// Clone a storage from a remote into `location`.
    pub fn clone_from(location: &Path, remote: &str, kind: StorageType) -> Result<Self> {
        debug!(location = %location.display(), remote, storage = %kind, "cloning storage");
        match kind {
            StorageType::Git => Ok(Self::Git(GitStorage::clone_from(location, remote)?)),
        }
    }

    /// Open an existing storage, detecting its backend from the location.
    pub fn open(location: &Path) -> Result<Self> {
        if !location.exists() {
            return Err(StorageError::NotFound(location.display().to_string()).into());
        }
        if GitStorage::detect(location) {
            return Ok(Self::Git(GitStorage::open(location)?));
        }
        Err(StorageError::Unsupported(format!(
            "no known storage at {}",
            location.display()
        ))
        .into())
    }

    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::Git(_) => StorageType::Git,
        }
    }

    /// Delete the local copy of the storage.
    pub fn destroy(self) -> Result<()> {
        match self {
            Self::Git(git) => git.destroy(),
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $inner:ident => $call:expr) => {
        match $self {
            Backend::Git($inner) => $call,
        }
    };
}

impl Storage for Backend {
    fn store(&self, path: &str, data: &[u8]) -> Result<()> {
        dispatch!(self, s => s.store(path, data))
    }

    fn remove(&self, path: &str) -> Result<()> {
        dispatch!(self, s => s.remove(path))
    }

    fn copy(&self, src: &str, dst: &str) -> Result<()> {
        dispatch!(self, s => s.copy(src, dst))
    }

    fn rename(&self, src: &str, dst: &str) -> Result<()> {
        dispatch!(self, s => s.rename(src, dst))
    }

    fn get(&self, path: &str) -> Result<Option<Vec<u8>>> {
        dispatch!(self, s => s.get(path))
    }

    fn get_latest(&self, path: &str) -> Result<Option<Vec<u8>>> {
        dispatch!(self, s => s.get_latest(path))
    }

    fn list(&self, path: &str) -> Result<Tree> {
        dispatch!(self, s => s.list(path))
    }

    fn add_remote(&self, name: &str, address: &str) -> Result<()> {
        dispatch!(self, s => s.add_remote(name, address))
    }

    fn has_remote(&self) -> Result<bool> {
        dispatch!(self, s => s.has_remote())
    }

    fn push(&self) -> Result<()> {
        dispatch!(self, s => s.push())
    }

    fn pull(&self) -> Result<()> {
        dispatch!(self, s => s.pull())
    }

    fn commit(&self, message: &str) -> Result<()> {
        dispatch!(self, s => s.commit(message))
    }

    fn rollback(&self) -> Result<()> {
        dispatch!(self, s => s.rollback())
    }

    fn name(&self) -> &'static str {
        dispatch!(self, s => s.name())
    }
}
