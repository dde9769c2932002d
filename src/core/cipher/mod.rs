//! Encryption service contract.
//!
//! Every secret field is encrypted for the store's full recipient set, so
//! any holder of a matching identity can decrypt it. The algorithm is
//! selected by the [`EncryptionType`] tag recorded in the manifest and
//! dispatched through the closed [`Backend`] enum.
//!
//! ## Backends
//!
//! - **age**: x25519 recipients, ASCII-armored ciphertext.
//!
//! ## Adding a New Backend
//!
//! 1. Implement the `Encryption` trait in a new file
//! 2. Add a variant to `EncryptionType`, `Provider` and `Backend`
//! 3. Extend the `Manager` dispatch

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

mod age;
mod backend;

pub use age::{parse_recipient, Age};
pub use backend::{Backend, Manager};

use crate::error::{CipherError, Result};

/// Multi-recipient encryption contract.
///
/// Implementations must be usable from several worker threads at once.
pub trait Encryption: Send + Sync {
    /// Encrypt plaintext so that any of `recipients` can open it.
    ///
    /// # Errors
    ///
    /// Returns `CipherError` if a recipient is invalid or encryption fails.
    fn encrypt(&self, plaintext: &[u8], recipients: &[Recipient]) -> Result<Vec<u8>>;

    /// Decrypt ciphertext with the first identity able to open it.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::DecryptionFailed` if none of the identities match.
    fn decrypt(&self, ciphertext: &[u8], identities: &[Identity]) -> Result<Zeroizing<Vec<u8>>>;

    /// Backend name for display.
    fn name(&self) -> &'static str;
}

/// Encryption algorithm tag stored in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncryptionType {
    #[default]
    Age,
}

impl EncryptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncryptionType::Age => "age",
        }
    }
}

impl std::fmt::Display for EncryptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EncryptionType {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "age" => Ok(EncryptionType::Age),
            other => Err(CipherError::UnknownEncryption(other.to_string()).into()),
        }
    }
}

/// Identity provider tag: which backend produced an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Age,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Age => "age",
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "age" => Ok(Provider::Age),
            other => Err(CipherError::UnknownProvider(other.to_string()).into()),
        }
    }
}

/// A public key authorized to have data encrypted for it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipient(String);

impl Recipient {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Recipient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Recipient {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A recipient's private key plus the provider that produced it.
#[derive(Clone)]
pub struct Identity {
    provider: Provider,
    recipient: Recipient,
    private_key: Zeroizing<String>,
}

impl Identity {
    pub fn new(provider: Provider, recipient: Recipient, private_key: Zeroizing<String>) -> Self {
        Self {
            provider,
            recipient,
            private_key,
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn recipient(&self) -> &Recipient {
        &self.recipient
    }

    /// Raw private key material.
    pub fn private_key(&self) -> &str {
        &self.private_key
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("provider", &self.provider)
            .field("recipient", &self.recipient)
            .finish_non_exhaustive()
    }
}
