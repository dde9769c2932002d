//! The secret store engine.
//!
//! A [`Store`] binds one manifest, one versioned storage and one encryption
//! service for a single session. Operations enforce path safety and the
//! packed/unpacked mode, and accumulate an operation log that [`Store::close`]
//! flushes as one commit.

mod crud;
mod lifecycle;
mod pack;

use std::sync::Arc;

use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::core::cipher::{self, Encryption, Identity};
use crate::core::constants::{DEFAULT_CONCURRENCY, MANIFEST_PATH};
use crate::core::domain::{Manifest, OperationLog, Secret};
use crate::core::identity::IdentityProvider;
use crate::core::storage::{self, path, Storage};
use crate::error::{CipherError, Error, Result, StoreError};

pub use lifecycle::{InitOptions, InitOutcome};
pub use pack::PackOptions;

/// One session over a secret store.
///
/// A store is not meant to be shared between sessions; callers open one,
/// run operations, then close it.
pub struct Store<S: Storage = storage::Backend, E: Encryption = cipher::Backend> {
    manifest: Manifest,
    storage: S,
    encryption: E,
    identities: Arc<dyn IdentityProvider>,
    oplog: OperationLog,
    concurrency: usize,
}

impl<S: Storage, E: Encryption> std::fmt::Debug for Store<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("manifest", &self.manifest)
            .field("storage", &self.storage.name())
            .field("encryption", &self.encryption.name())
            .field("pending", &self.oplog.entries().len())
            .finish()
    }
}

/// Read and parse the manifest from a storage.
pub(crate) fn read_manifest<S: Storage>(storage: &S) -> Result<Manifest> {
    let data = storage
        .get(MANIFEST_PATH)?
        .ok_or_else(|| StoreError::ManifestNotFound(storage.name().to_string()))?;
    Manifest::from_json(&data)
}

impl<S: Storage> Store<S, cipher::Backend> {
    /// Open a store over `storage`, binding the encryption service named by
    /// its manifest.
    ///
    /// # Errors
    ///
    /// Fails if the manifest is missing or is not a store manifest.
    pub fn load(storage: S, identities: Arc<dyn IdentityProvider>) -> Result<Self> {
        let manifest = read_manifest(&storage)?;
        let encryption = cipher::Manager.service(manifest.encryption());
        Ok(Self::from_parts(manifest, storage, encryption, identities))
    }
}

impl<S: Storage, E: Encryption> Store<S, E> {
    /// Open a store with an explicit encryption service.
    pub fn load_with(storage: S, encryption: E, identities: Arc<dyn IdentityProvider>) -> Result<Self> {
        let manifest = read_manifest(&storage)?;
        if manifest.encryption().as_str() != encryption.name() {
            return Err(CipherError::UnknownEncryption(format!(
                "store uses {}, service is {}",
                manifest.encryption(),
                encryption.name()
            ))
            .into());
        }
        Ok(Self::from_parts(manifest, storage, encryption, identities))
    }

    pub(crate) fn from_parts(
        manifest: Manifest,
        storage: S,
        encryption: E,
        identities: Arc<dyn IdentityProvider>,
    ) -> Self {
        debug!(
            storage = storage.name(),
            encryption = encryption.name(),
            recipients = manifest.recipients().len(),
            unpacked = manifest.is_unpacked(),
            "store opened"
        );
        Self {
            manifest,
            storage,
            encryption,
            identities,
            oplog: OperationLog::new(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set the pack/unpack worker pool width.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Operations recorded since the last close.
    pub fn pending(&self) -> &OperationLog {
        &self.oplog
    }

    /// Commit every recorded operation as one commit.
    ///
    /// An empty log commits nothing. The log is drained, so closing twice
    /// commits at most once.
    pub fn close(&mut self) -> Result<()> {
        if self.oplog.is_empty() {
            return Ok(());
        }
        let message = std::mem::take(&mut self.oplog).message();
        debug!(message = %message, "committing session");
        self.storage.commit(&message)
    }

    /// Run `f` then close the store, reporting both failures if both fail.
    pub fn session<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let result = f(self);
        let closed = self.close();
        Error::join(result, closed)
    }

    pub(crate) fn assert_packed(&self) -> Result<()> {
        if self.manifest.is_unpacked() {
            return Err(StoreError::Unpacked.into());
        }
        Ok(())
    }

    pub(crate) fn assert_unpacked(&self) -> Result<()> {
        if !self.manifest.is_unpacked() {
            return Err(StoreError::Packed.into());
        }
        Ok(())
    }

    /// Normalize a user path and reject storage-internal ones.
    pub(crate) fn check_path(&self, p: &str) -> Result<String> {
        let normalized = path::normalize(p)?;
        if path::is_reserved(&normalized) {
            return Err(StoreError::ReservedPath(normalized).into());
        }
        Ok(normalized)
    }

    /// Identities available for the manifest's recipients, possibly none.
    pub(crate) fn collect_identities(&self) -> Result<Vec<Identity>> {
        let mut found = Vec::new();
        for recipient in self.manifest.recipients() {
            if let Some(identity) = self.identities.identity_by_recipient(recipient)? {
                found.push(identity);
            }
        }
        debug!(
            resolved = found.len(),
            recipients = self.manifest.recipients().len(),
            "resolved identities"
        );
        Ok(found)
    }

    /// Identities for decryption; at least one is required.
    pub(crate) fn resolve_identities(&self) -> Result<Vec<Identity>> {
        let found = self.collect_identities()?;
        if found.is_empty() {
            warn!("no identity matches any store recipient");
            return Err(CipherError::NoIdentities.into());
        }
        Ok(found)
    }

    pub(crate) fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.encryption.encrypt(plaintext, self.manifest.recipients())
    }

    pub(crate) fn decrypt(
        &self,
        ciphertext: &[u8],
        identities: &[Identity],
    ) -> Result<Zeroizing<Vec<u8>>> {
        if identities.is_empty() {
            return Err(CipherError::NoIdentities.into());
        }
        self.encryption.decrypt(ciphertext, identities)
    }

    pub(crate) fn read_secret(&self, p: &str) -> Result<Option<Secret>> {
        match self.storage.get(p)? {
            Some(data) => Secret::from_json(&data).map(Some),
            None => Ok(None),
        }
    }

    pub(crate) fn write_secret(&self, p: &str, secret: &Secret) -> Result<()> {
        self.storage.store(p, &secret.to_json()?)
    }

    /// Persist a new manifest and make it current.
    pub(crate) fn replace_manifest(&mut self, manifest: Manifest) -> Result<()> {
        self.storage.store(MANIFEST_PATH, &manifest.to_json()?)?;
        self.manifest = manifest;
        Ok(())
    }
}
