//! Store lifecycle: create, clone and open.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::{read_manifest, Store};
use crate::core::cipher::{self, EncryptionType, Identity, Manager, Recipient};
use crate::core::config::Settings;
use crate::core::constants::{INIT_MESSAGE, MANIFEST_PATH};
use crate::core::domain::Manifest;
use crate::core::identity::IdentityProvider;
use crate::core::storage::{self, Storage, StorageType};
use crate::error::{Error, Result, StoreError};

/// Options for [`Store::init`].
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Public keys allowed to decrypt. Empty means a new identity is
    /// generated and becomes the only recipient.
    pub recipients: Vec<Recipient>,
    pub storage: StorageType,
    pub encryption: EncryptionType,
    /// Remote address registered as `origin` and pushed to.
    pub remote: Option<String>,
}

/// Result of creating a store.
#[derive(Debug)]
pub struct InitOutcome {
    pub path: PathBuf,
    /// Identity generated because no recipients were given.
    pub identity: Option<Identity>,
}

/// Destroy a half-created storage, keeping the original error.
fn discard<T>(backend: storage::Backend, err: Error) -> Result<T> {
    Error::join(Err(err), backend.destroy())
}

impl Store {
    /// Create a new store at `location`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if `location` exists and
    /// `CipherError::InvalidRecipient` for malformed recipients.
    pub fn init(location: &Path, options: InitOptions) -> Result<InitOutcome> {
        let manager = Manager;
        for recipient in &options.recipients {
            manager.validate_recipient(options.encryption, recipient)?;
        }

        let (recipients, identity) = if options.recipients.is_empty() {
            let identity = manager.generate_identity(options.encryption);
            debug!(recipient = %identity.recipient(), "generated store identity");
            (vec![identity.recipient().clone()], Some(identity))
        } else {
            (options.recipients, None)
        };
        let manifest = Manifest::new(options.storage, options.encryption, recipients)?;

        let backend =
            storage::Backend::init(location, options.remote.as_deref(), options.storage)?;
        if let Err(e) = Self::seed(&backend, &manifest, options.remote.is_some()) {
            return discard(backend, e);
        }

        info!(
            path = %location.display(),
            recipients = manifest.recipients().len(),
            "store initialized"
        );
        Ok(InitOutcome {
            path: location.to_path_buf(),
            identity,
        })
    }

    fn seed(backend: &storage::Backend, manifest: &Manifest, push: bool) -> Result<()> {
        backend.store(MANIFEST_PATH, &manifest.to_json()?)?;
        backend.commit(INIT_MESSAGE)?;
        if push {
            backend.push()?;
        }
        Ok(())
    }

    /// Clone a store from `remote` into `location`.
    pub fn clone_from(
        location: &Path,
        remote: &str,
        kind: StorageType,
        identities: Arc<dyn IdentityProvider>,
    ) -> Result<Self> {
        let backend = storage::Backend::clone_from(location, remote, kind)?;
        let manifest = match Self::verify(&backend) {
            Ok(manifest) => manifest,
            Err(e) => return discard(backend, e),
        };

        info!(path = %location.display(), "store cloned");
        let encryption = cipher::Manager.service(manifest.encryption());
        Ok(Self::from_parts(manifest, backend, encryption, identities))
    }

    /// Open an existing store, detecting its backend from the location.
    ///
    /// # Errors
    ///
    /// Fails if nothing is stored at `location`, the manifest is missing or
    /// invalid, or it names a different backend than the one found.
    pub fn open(
        location: &Path,
        identities: Arc<dyn IdentityProvider>,
        settings: &Settings,
    ) -> Result<Self> {
        let backend = storage::Backend::open(location)?;
        let manifest = Self::verify(&backend)?;
        let encryption = cipher::Manager.service(manifest.encryption());

        Ok(Self::from_parts(manifest, backend, encryption, identities)
            .with_concurrency(settings.concurrency))
    }

    fn verify(backend: &storage::Backend) -> Result<Manifest> {
        let manifest = read_manifest(backend)?;
        if manifest.storage_type() != backend.storage_type() {
            return Err(StoreError::StorageMismatch {
                declared: manifest.storage_type().to_string(),
                detected: backend.storage_type().to_string(),
            }
            .into());
        }
        Ok(manifest)
    }
}
