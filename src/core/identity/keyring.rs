//! Filesystem keyring.
//!
//! Manages identities on the local filesystem (`~/.stowage/identities/`),
//! one file per recipient, written in the provider's raw export format.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::IdentityProvider;
use crate::core::cipher::{Identity, Manager, Provider, Recipient};
use crate::error::{CipherError, Result, StorageError, ValidationError};

/// Directory of identity files keyed by recipient.
#[derive(Debug, Clone)]
pub struct Keyring {
    dir: PathBuf,
    manager: Manager,
}

impl Keyring {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            manager: Manager,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Recipients name files directly, so anything that could leave the
    /// directory is refused.
    fn key_path(&self, recipient: &Recipient) -> Result<PathBuf> {
        let name = recipient.to_string();
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(CipherError::InvalidRecipient(name).into());
        }
        Ok(self.dir.join(format!("{}.key", name)))
    }

    /// Save an identity, restricting the file to its owner on Unix.
    pub fn save(&self, identity: &Identity) -> Result<PathBuf> {
        debug!(recipient = %identity.recipient(), "saving identity");

        fs::create_dir_all(&self.dir)
            .map_err(|e| StorageError::io("create", self.dir.display().to_string(), e))?;

        let path = self.key_path(identity.recipient())?;
        let raw = self.manager.export_raw_identity(identity)?;
        fs::write(&path, raw.as_slice())
            .map_err(|e| StorageError::io("write", path.display().to_string(), e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
                .map_err(|e| StorageError::io("chmod", path.display().to_string(), e))?;
        }

        Ok(path)
    }

    /// Recipients that have an identity in this keyring.
    pub fn list(&self) -> Result<Vec<Recipient>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.dir)
            .map_err(|e| StorageError::io("read", self.dir.display().to_string(), e))?;

        let mut recipients = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| StorageError::io("read", self.dir.display().to_string(), e))?;
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(stem) = name.strip_suffix(".key") {
                recipients.push(Recipient::new(stem));
            }
        }
        recipients.sort();
        Ok(recipients)
    }

    #[cfg(unix)]
    fn validate_file_permissions(path: &Path, expected_mode: u32) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata =
            fs::metadata(path).map_err(|e| StorageError::io("stat", path.display().to_string(), e))?;
        let actual_mode = metadata.permissions().mode() & 0o777;

        if actual_mode != expected_mode {
            return Err(ValidationError::InvalidPermissions {
                path: path.display().to_string(),
                expected: format!("{:o}", expected_mode),
                actual: format!("{:o}", actual_mode),
            }
            .into());
        }

        Ok(())
    }
}

impl IdentityProvider for Keyring {
    fn identity_by_recipient(&self, recipient: &Recipient) -> Result<Option<Identity>> {
        let path = match self.key_path(recipient) {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "ignoring recipient");
                return Ok(None);
            }
        };
        if !path.exists() {
            return Ok(None);
        }

        #[cfg(unix)]
        {
            if let Err(e) = Self::validate_file_permissions(&path, 0o600) {
                warn!(error = %e, "insecure key file permissions");
            }
        }

        let raw = fs::read(&path).map_err(|e| StorageError::io("read", path.display().to_string(), e))?;
        let identity = self.manager.import_raw_identity(Provider::Age, &raw)?;

        if identity.recipient() != recipient {
            warn!(
                path = %path.display(),
                expected = %recipient,
                found = %identity.recipient(),
                "key file does not match its recipient"
            );
            return Ok(None);
        }

        debug!(recipient = %recipient, "identity loaded");
        Ok(Some(identity))
    }
}
