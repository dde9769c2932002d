//! Age encryption backend implementation.
//!
//! Provides encryption/decryption using the age format with x25519 keys
//! and ASCII armor encoding.

use std::io::{Read, Write};

use ::age::secrecy::ExposeSecret;
use ::age::x25519;
use tracing::trace;
use zeroize::Zeroizing;

use super::{Encryption, Identity, Provider, Recipient};
use crate::error::{CipherError, Result};

/// Age-based encryption backend using x25519 keys
#[derive(Debug, Default, Clone, Copy)]
pub struct Age;

impl Age {
    /// Generate a fresh x25519 identity.
    pub fn generate_identity(&self) -> Identity {
        let inner = x25519::Identity::generate();
        Self::wrap(&inner)
    }

    /// Parse a raw identity file (comments allowed) holding exactly one key.
    pub fn load_raw_identity(&self, data: &[u8]) -> Result<Identity> {
        let text = std::str::from_utf8(data)
            .map_err(|e| CipherError::InvalidIdentity(format!("not UTF-8: {}", e)))?;

        let keys: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect();
        if keys.len() != 1 {
            return Err(CipherError::InvalidIdentity(format!(
                "invalid count of parsed identities: {}",
                keys.len()
            ))
            .into());
        }

        let inner = parse_identity(keys[0])?;
        Ok(Self::wrap(&inner))
    }

    /// Export an identity in age format with the recipient in a comment.
    pub fn export_raw_identity(&self, identity: &Identity) -> Result<Zeroizing<Vec<u8>>> {
        let inner = parse_identity(identity.private_key())?;
        let raw = format!(
            "# {}\n{}\n",
            inner.to_public(),
            inner.to_string().expose_secret()
        );
        Ok(Zeroizing::new(raw.into_bytes()))
    }

    fn wrap(inner: &x25519::Identity) -> Identity {
        Identity::new(
            Provider::Age,
            Recipient::new(inner.to_public().to_string()),
            Zeroizing::new(inner.to_string().expose_secret().to_string()),
        )
    }
}

impl Encryption for Age {
    fn name(&self) -> &'static str {
        "age"
    }

    fn encrypt(&self, plaintext: &[u8], recipients: &[Recipient]) -> Result<Vec<u8>> {
        trace!(
            recipients = recipients.len(),
            plaintext_len = plaintext.len(),
            "encrypting"
        );

        let parsed = recipients
            .iter()
            .map(|r| parse_recipient(r.as_str()))
            .collect::<Result<Vec<_>>>()?;

        let encryptor =
            age::Encryptor::with_recipients(parsed.iter().map(|r| r as &dyn age::Recipient))
                .map_err(|e| CipherError::EncryptionFailed(format!("{}", e)))?;

        let mut encrypted = Vec::new();
        let mut writer = encryptor
            .wrap_output(
                age::armor::ArmoredWriter::wrap_output(
                    &mut encrypted,
                    age::armor::Format::AsciiArmor,
                )
                .map_err(|e| CipherError::ArmorFailed(format!("{}", e)))?,
            )
            .map_err(|e| CipherError::EncryptionFailed(format!("{}", e)))?;

        writer
            .write_all(plaintext)
            .map_err(|e| CipherError::EncryptionFailed(format!("{}", e)))?;
        let armored = writer
            .finish()
            .map_err(|e| CipherError::EncryptionFailed(format!("{}", e)))?;
        armored
            .finish()
            .map_err(|e| CipherError::ArmorFailed(format!("{}", e)))?;

        trace!(ciphertext_len = encrypted.len(), "encrypted");

        Ok(encrypted)
    }

    fn decrypt(&self, ciphertext: &[u8], identities: &[Identity]) -> Result<Zeroizing<Vec<u8>>> {
        trace!(
            ciphertext_len = ciphertext.len(),
            identities = identities.len(),
            "decrypting"
        );

        let parsed = identities
            .iter()
            .map(|i| parse_identity(i.private_key()))
            .collect::<Result<Vec<_>>>()?;

        let reader = age::armor::ArmoredReader::new(ciphertext);
        let decryptor = age::Decryptor::new(reader)
            .map_err(|e| CipherError::DecryptionFailed(format!("{}", e)))?;

        let mut reader = decryptor
            .decrypt(parsed.iter().map(|i| i as &dyn age::Identity))
            .map_err(|e| CipherError::DecryptionFailed(format!("{}", e)))?;

        let mut decrypted = Zeroizing::new(Vec::new());
        reader
            .read_to_end(&mut decrypted)
            .map_err(|e| CipherError::DecryptionFailed(format!("{}", e)))?;

        trace!(plaintext_len = decrypted.len(), "decrypted");

        Ok(decrypted)
    }
}

/// Parse a public key string into an age recipient
///
/// # Errors
///
/// Returns `CipherError::InvalidRecipient` if the key format is invalid.
pub fn parse_recipient(key: &str) -> Result<x25519::Recipient> {
    key.parse::<x25519::Recipient>()
        .map_err(|_| CipherError::InvalidRecipient(key.to_string()).into())
}

fn parse_identity(key: &str) -> Result<x25519::Identity> {
    key.trim()
        .parse::<x25519::Identity>()
        .map_err(|e: &str| CipherError::InvalidIdentity(e.to_string()).into())
}
