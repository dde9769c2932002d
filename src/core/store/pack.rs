//! Pack and unpack.
//!
//! Unpacking writes every secret as plaintext so it can be edited in
//! place; packing encrypts the edited content back. Packing compares each
//! field with the last committed version and keeps the committed
//! ciphertext for values that did not change, so history only shows real
//! edits.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::Store;
use crate::core::cancel::Cancel;
use crate::core::cipher::{Encryption, Identity};
use crate::core::domain::{RawSecret, Secret};
use crate::core::pool::WorkerPool;
use crate::core::progress::Progress;
use crate::core::storage::Storage;
use crate::error::{Error, Result, SecretError, StorageError};

/// Options for [`Store::pack`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PackOptions {
    /// Encrypt every field fresh instead of comparing against history.
    pub skip_changes_check: bool,
}

impl<S: Storage, E: Encryption> Store<S, E> {
    /// Replace every secret with its plaintext form.
    ///
    /// All-or-nothing: on any failure the working tree is rolled back
    /// before the error is returned, along with every uncommitted change of
    /// the session and its log entries. Nothing is added to the operation log,
    /// so plaintext is never committed by `close`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unpacked` when the store is already unpacked,
    /// or the first per-secret failure wrapped in `SecretError::Pack`.
    pub fn unpack(&mut self, cancel: &Cancel, progress: &dyn Progress) -> Result<()> {
        self.assert_packed()?;

        let result = self.unpack_all(cancel, progress);
        if let Err(e) = result {
            warn!(error = %e, "unpack failed, rolling back");
            let rolled_back = self.rollback();
            return Error::join(Err(e), rolled_back);
        }

        info!("store unpacked");
        Ok(())
    }

    fn unpack_all(&mut self, cancel: &Cancel, progress: &dyn Progress) -> Result<()> {
        let leaves = self.list("")?.leaf_paths();
        let identities = self.resolve_identities_for(&leaves)?;
        let pool = WorkerPool::new(self.concurrency)?;

        debug!(secrets = leaves.len(), "unpacking");
        pool.run(&leaves, cancel, progress, |leaf, scope| {
            self.unpack_secret(leaf, &identities, scope)
                .map_err(|e| pack_error(leaf, e))
        })?;

        cancel.check()?;
        let unpacked = self.manifest.with_unpacked(true);
        self.replace_manifest(unpacked)
    }

    /// Identities are only required when there is something to decrypt.
    fn resolve_identities_for(&self, leaves: &[String]) -> Result<Vec<Identity>> {
        if leaves.is_empty() {
            return Ok(Vec::new());
        }
        self.resolve_identities()
    }

    fn unpack_secret(&self, leaf: &str, identities: &[Identity], cancel: &Cancel) -> Result<()> {
        cancel.check()?;
        let secret = self
            .read_secret(leaf)?
            .ok_or_else(|| SecretError::NotFound(leaf.to_string()))?;

        let mut fields = BTreeMap::new();
        for (name, ciphertext) in secret.fields() {
            cancel.check()?;
            fields.insert(name.to_string(), self.decrypt(ciphertext, identities)?);
        }

        let raw = RawSecret::from_fields(fields).serialize()?;
        cancel.check()?;
        self.storage.store(leaf, &raw)
    }

    /// Encrypt every plaintext secret back into packed form.
    ///
    /// Each secret is encrypted in the worker pool; results are written
    /// only after every secret succeeded, so a failure leaves the
    /// plaintext in place. A secret left without fields is removed. Appends "Pack store" to the operation log.
    pub fn pack(
        &mut self,
        options: PackOptions,
        cancel: &Cancel,
        progress: &dyn Progress,
    ) -> Result<()> {
        self.assert_unpacked()?;

        let leaves = self.list("")?.leaf_paths();
        // Resolved once; an empty set only fails if a comparison is needed.
        let identities = if options.skip_changes_check {
            Vec::new()
        } else {
            self.collect_identities()?
        };
        let pool = WorkerPool::new(self.concurrency)?;

        debug!(
            secrets = leaves.len(),
            skip_changes_check = options.skip_changes_check,
            "packing"
        );
        let packed = pool.run(&leaves, cancel, progress, |leaf, scope| {
            self.pack_secret(leaf, options, &identities, scope)
                .map_err(|e| pack_error(leaf, e))
        })?;

        cancel.check()?;
        for (leaf, data) in leaves.iter().zip(packed) {
            match data {
                Some(data) => self.storage.store(leaf, &data)?,
                None => {
                    debug!(path = %leaf, "removing secret without fields");
                    self.storage.remove(leaf)?;
                }
            }
        }

        let packed_manifest = self.manifest.with_unpacked(false);
        self.replace_manifest(packed_manifest)?;
        self.oplog.pack();

        info!(secrets = leaves.len(), "store packed");
        Ok(())
    }

    fn pack_secret(
        &self,
        leaf: &str,
        options: PackOptions,
        identities: &[Identity],
        cancel: &Cancel,
    ) -> Result<Option<Vec<u8>>> {
        cancel.check()?;
        let content = self
            .storage
            .get(leaf)?
            .ok_or_else(|| StorageError::NotFound(leaf.to_string()))?;
        let fields = RawSecret::deserialize(&content).into_fields();
        // every field was deleted while unpacked
        if fields.is_empty() {
            return Ok(None);
        }

        let latest = if options.skip_changes_check {
            None
        } else {
            cancel.check()?;
            self.storage.get_latest(leaf)?
        };

        let secret = match latest {
            Some(latest) => {
                let latest = Secret::from_json(&latest)?;
                self.merge_with_latest(fields, &latest, identities, cancel)?
            }
            None => self.encrypt_fresh(fields, cancel)?,
        };
        secret.to_json().map(Some)
    }

    fn encrypt_fresh(
        &self,
        fields: BTreeMap<String, Zeroizing<Vec<u8>>>,
        cancel: &Cancel,
    ) -> Result<Secret> {
        let mut secret = Secret::new();
        for (name, plaintext) in fields {
            cancel.check()?;
            secret.add_data(Some(&name), self.encrypt(&plaintext)?)?;
        }
        Ok(secret)
    }

    /// Keep committed ciphertext for fields whose plaintext is unchanged.
    fn merge_with_latest(
        &self,
        fields: BTreeMap<String, Zeroizing<Vec<u8>>>,
        latest: &Secret,
        identities: &[Identity],
        cancel: &Cancel,
    ) -> Result<Secret> {
        let mut secret = Secret::new();
        for (name, plaintext) in fields {
            cancel.check()?;
            let kept = match latest.get_by_key(Some(&name)) {
                Some(old) => {
                    let previous = self.decrypt(old, identities)?;
                    (previous.as_slice() == plaintext.as_slice()).then(|| old.to_vec())
                }
                None => None,
            };

            let ciphertext = match kept {
                Some(old) => old,
                None => {
                    cancel.check()?;
                    self.encrypt(&plaintext)?
                }
            };
            secret.add_data(Some(&name), ciphertext)?;
        }
        Ok(secret)
    }
}

fn pack_error(path: &str, err: Error) -> Error {
    if err.is_cancelled() {
        return err;
    }
    SecretError::Pack {
        path: path.to_string(),
        source: Box::new(err),
    }
    .into()
}
