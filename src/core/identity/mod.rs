//! Identity resolution.
//!
//! Stores never hold private keys. When a decrypt is needed, the engine
//! asks an [`IdentityProvider`] for an identity matching each recipient in
//! the manifest.
//!
//! ## Adding a New Provider
//!
//! 1. Implement the `IdentityProvider` trait
//! 2. Add the implementation in a new file (e.g., `agent.rs`)
//! 3. Re-export from this module

use crate::core::cipher::{Identity, Recipient};
use crate::error::Result;

mod keyring;

pub use keyring::Keyring;

/// Resolves usable private identities by recipient public key.
pub trait IdentityProvider: Send + Sync {
    /// Look up the identity for a recipient.
    ///
    /// Absence is not an error at this layer.
    ///
    /// # Errors
    ///
    /// Returns an error only if the provider itself fails (e.g. an
    /// unreadable or malformed key file).
    fn identity_by_recipient(&self, recipient: &Recipient) -> Result<Option<Identity>>;
}

/// In-memory provider over a fixed set of identities.
#[derive(Debug, Default, Clone)]
pub struct StaticIdentities {
    identities: Vec<Identity>,
}

impl StaticIdentities {
    pub fn new(identities: Vec<Identity>) -> Self {
        Self { identities }
    }

    /// Provider that resolves nothing.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl IdentityProvider for StaticIdentities {
    fn identity_by_recipient(&self, recipient: &Recipient) -> Result<Option<Identity>> {
        Ok(self
            .identities
            .iter()
            .find(|i| i.recipient() == recipient)
            .cloned())
    }
}
