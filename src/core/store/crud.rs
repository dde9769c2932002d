//! Secret operations.
//!
//! CRUD over individual secrets. Every operation except `list` and
//! `rollback` requires the store to be packed.

use tracing::{debug, info};

use super::Store;
use crate::core::cipher::Encryption;
use crate::core::constants::RESERVED_PATHS;
use crate::core::domain::{Secret, SecretData};
use crate::core::storage::{path, Storage, Tree};
use crate::error::{Error, Result, SecretError, StorageError, StoreError};

impl<S: Storage, E: Encryption> Store<S, E> {
    /// Encrypt `data` into one field of the secret at `path`.
    ///
    /// Creates the secret if needed; other fields are left untouched.
    ///
    /// # Arguments
    ///
    /// * `path` - Secret location, slash-delimited
    /// * `key` - Field name, or `None` for the default field
    /// * `data` - Plaintext value
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unpacked` while unpacked and
    /// `StoreError::ReservedPath` for storage-internal paths.
    pub fn add(&mut self, path: &str, key: Option<&str>, data: &[u8]) -> Result<()> {
        self.assert_packed()?;
        let path = self.check_path(path)?;

        let mut secret = self.read_secret(&path)?.unwrap_or_else(Secret::new);
        let ciphertext = self.encrypt(data)?;
        secret.add_data(key, ciphertext)?;
        self.write_secret(&path, &secret)?;

        debug!(path = %path, key = ?key, fields = secret.len(), "secret added");
        self.oplog.add(&path, key);
        Ok(())
    }

    /// Decrypt one field, or every field sorted by name.
    ///
    /// A secret that does not exist yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::NoIdentities` when no recipient has a usable
    /// identity and `SecretError::FieldNotFound` when the requested field
    /// is missing from an existing secret.
    pub fn get(&self, path: &str, key: Option<&str>) -> Result<Vec<SecretData>> {
        self.assert_packed()?;
        let path = self.check_path(path)?;

        let Some(secret) = self.read_secret(&path)? else {
            debug!(path = %path, "secret not found");
            return Ok(Vec::new());
        };

        let identities = self.resolve_identities()?;

        if let Some(name) = key {
            let ciphertext = secret
                .get_by_key(Some(name))
                .ok_or_else(|| SecretError::FieldNotFound {
                    path: path.clone(),
                    key: name.to_string(),
                })?;
            let plaintext = self.decrypt(ciphertext, &identities)?;
            return Ok(vec![SecretData::new(name, plaintext)]);
        }

        secret
            .fields()
            .map(|(name, ciphertext)| {
                self.decrypt(ciphertext, &identities)
                    .map(|plaintext| SecretData::new(name, plaintext))
            })
            .collect()
    }

    /// Copy a secret or a whole subtree.
    pub fn copy(&mut self, src: &str, dst: &str) -> Result<()> {
        self.assert_packed()?;
        let src = self.check_path(src)?;
        let dst = self.check_path(dst)?;
        if src == dst {
            return Ok(());
        }

        self.storage.copy(&src, &dst).map_err(|e| not_found(e, &src))?;

        debug!(src = %src, dst = %dst, "copied");
        self.oplog.copy(&src, &dst);
        Ok(())
    }

    /// Move a secret or a whole subtree.
    pub fn rename(&mut self, src: &str, dst: &str) -> Result<()> {
        self.assert_packed()?;
        let src = self.check_path(src)?;
        let dst = self.check_path(dst)?;
        if src == dst {
            return Ok(());
        }

        self.storage
            .rename(&src, &dst)
            .map_err(|e| not_found(e, &src))?;

        debug!(src = %src, dst = %dst, "moved");
        self.oplog.rename(&src, &dst);
        Ok(())
    }

    /// Listing rooted at `path`; the empty path lists the whole store.
    ///
    /// Allowed in either mode.
    pub fn list(&self, path: &str) -> Result<Tree> {
        let root = path::normalize_root(path)?;
        if root.is_empty() {
            let tree = self.storage.list(&root)?;
            return Ok(tree.without(|name| RESERVED_PATHS.contains(&name)));
        }
        if path::is_reserved(&root) {
            return Err(StoreError::ReservedPath(root).into());
        }
        self.storage.list(&root)
    }

    /// Remove a whole secret (or subtree), or one field of a secret.
    ///
    /// Removing the last field removes the secret.
    pub fn remove(&mut self, path: &str, key: Option<&str>) -> Result<()> {
        self.assert_packed()?;
        let path = self.check_path(path)?;

        let Some(name) = key else {
            self.storage.remove(&path).map_err(|e| not_found(e, &path))?;
            debug!(path = %path, "secret removed");
            self.oplog.remove(&path, None);
            return Ok(());
        };

        let mut secret = self
            .read_secret(&path)?
            .ok_or_else(|| SecretError::NotFound(path.clone()))?;
        if !secret.remove(Some(name)) {
            return Err(SecretError::FieldNotFound {
                path,
                key: name.to_string(),
            }
            .into());
        }

        if secret.is_empty() {
            self.storage.remove(&path)?;
            debug!(path = %path, "last field removed, secret deleted");
            self.oplog.remove_empty(&path);
            return Ok(());
        }

        self.write_secret(&path, &secret)?;
        debug!(path = %path, key = name, "field removed");
        self.oplog.remove(&path, Some(name));
        Ok(())
    }

    /// Pull from the remote, then push.
    pub fn sync(&self) -> Result<()> {
        self.assert_packed()?;
        self.storage.pull()?;
        self.storage.push()?;
        info!("store synchronized");
        Ok(())
    }

    /// Discard every uncommitted change, in either mode.
    ///
    /// The manifest is reloaded so the in-memory mode matches the restored
    /// content, and pending operations are dropped.
    pub fn rollback(&mut self) -> Result<()> {
        self.storage.rollback()?;
        self.oplog = Default::default();
        self.manifest = super::read_manifest(&self.storage)?;
        info!("uncommitted changes discarded");
        Ok(())
    }
}

/// Report a missing source as a missing secret.
fn not_found(err: Error, path: &str) -> Error {
    match err {
        Error::Storage(StorageError::NotFound(_)) => SecretError::NotFound(path.to_string()).into(),
        other => other,
    }
}
