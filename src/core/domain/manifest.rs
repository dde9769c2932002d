//! Store manifest.
//!
//! One manifest lives at a reserved path inside every store. It records the
//! storage backend, the encryption algorithm, the recipient set and whether
//! the store is currently unpacked.

use serde::{Deserialize, Serialize};

use crate::core::cipher::{EncryptionType, Recipient};
use crate::core::constants::STORE_KIND;
use crate::core::storage::StorageType;
use crate::error::{Result, SecretError, StoreError, ValidationError};

/// Immutable snapshot of a store's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    storage_type: StorageType,
    encryption: EncryptionType,
    recipients: Vec<Recipient>,
    unpacked: bool,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Wire {
    kind: String,
    storage_type: StorageType,
    encryption: EncryptionType,
    recipients: Vec<Recipient>,
    #[serde(default)]
    unpacked: bool,
}

impl Manifest {
    /// Create a packed manifest.
    ///
    /// Duplicate recipients are dropped, keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::NoRecipients` for an empty recipient set.
    pub fn new(
        storage_type: StorageType,
        encryption: EncryptionType,
        recipients: Vec<Recipient>,
    ) -> Result<Self> {
        let mut unique: Vec<Recipient> = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            if !unique.contains(&recipient) {
                unique.push(recipient);
            }
        }
        if unique.is_empty() {
            return Err(ValidationError::NoRecipients.into());
        }

        Ok(Self {
            storage_type,
            encryption,
            recipients: unique,
            unpacked: false,
        })
    }

    pub fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    pub fn encryption(&self) -> EncryptionType {
        self.encryption
    }

    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    pub fn is_unpacked(&self) -> bool {
        self.unpacked
    }

    /// Copy of this manifest with the mode flag set.
    pub fn with_unpacked(&self, unpacked: bool) -> Self {
        Self {
            unpacked,
            ..self.clone()
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        let wire = Wire {
            kind: STORE_KIND.to_string(),
            storage_type: self.storage_type,
            encryption: self.encryption,
            recipients: self.recipients.clone(),
            unpacked: self.unpacked,
        };
        let mut out = serde_json::to_vec_pretty(&wire).map_err(|e| SecretError::Malformed {
            what: "manifest",
            reason: e.to_string(),
        })?;
        out.push(b'\n');
        Ok(out)
    }

    /// Parse a manifest, rejecting payloads of any other kind.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let wire: Wire = serde_json::from_slice(data)
            .map_err(|e| StoreError::InvalidManifest(e.to_string()))?;
        if wire.kind != STORE_KIND {
            return Err(SecretError::UnexpectedKind {
                expected: STORE_KIND,
                found: wire.kind,
            }
            .into());
        }

        let unpacked = wire.unpacked;
        let manifest = Self::new(wire.storage_type, wire.encryption, wire.recipients)
            .map_err(|e| StoreError::InvalidManifest(e.to_string()))?;
        Ok(manifest.with_unpacked(unpacked))
    }
}
