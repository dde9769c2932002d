//! Encryption backend selection and dispatch.
//!
//! The set of algorithms is closed and known at build time, so dispatch
//! is a plain enum match rather than a trait object.

use tracing::debug;
use zeroize::Zeroizing;

use super::{Age, Encryption, EncryptionType, Identity, Provider, Recipient};
use crate::error::Result;

/// Encryption backend bound to a store.
#[derive(Debug, Clone, Copy)]
pub enum Backend {
    /// age encryption (default)
    Age(Age),
}

impl Backend {
    /// Create a backend for the manifest's algorithm tag.
    pub fn for_type(encryption: EncryptionType) -> Self {
        match encryption {
            EncryptionType::Age => {
                debug!("creating age encryption backend");
                Self::Age(Age)
            }
        }
    }
}

impl Encryption for Backend {
    fn encrypt(&self, plaintext: &[u8], recipients: &[Recipient]) -> Result<Vec<u8>> {
        match self {
            Self::Age(age) => age.encrypt(plaintext, recipients),
        }
    }

    fn decrypt(&self, ciphertext: &[u8], identities: &[Identity]) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            Self::Age(age) => age.decrypt(ciphertext, identities),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Age(age) => age.name(),
        }
    }
}

/// Identity lifecycle operations keyed by algorithm or provider tag,
/// independent from any single store.
#[derive(Debug, Default, Clone, Copy)]
pub struct Manager;

impl Manager {
    /// Encryption service for a manifest's algorithm tag.
    pub fn service(&self, encryption: EncryptionType) -> Backend {
        Backend::for_type(encryption)
    }

    /// Generate a new identity for the given algorithm.
    pub fn generate_identity(&self, encryption: EncryptionType) -> Identity {
        match encryption {
            EncryptionType::Age => Age.generate_identity(),
        }
    }

    /// Check that a recipient is a valid public key for the algorithm.
    pub fn validate_recipient(&self, encryption: EncryptionType, recipient: &Recipient) -> Result<()> {
        match encryption {
            EncryptionType::Age => super::parse_recipient(recipient.as_str()).map(|_| ()),
        }
    }

    /// Import an identity from its raw exported form.
    pub fn import_raw_identity(&self, provider: Provider, data: &[u8]) -> Result<Identity> {
        match provider {
            Provider::Age => Age.load_raw_identity(data),
        }
    }

    /// Export an identity's private material in its provider's raw form.
    pub fn export_raw_identity(&self, identity: &Identity) -> Result<Zeroizing<Vec<u8>>> {
        match identity.provider() {
            Provider::Age => Age.export_raw_identity(identity),
        }
    }
}
