//! Secret records.
//!
//! A secret is a set of named fields, each holding one encrypted value.
//! Packed secrets are stored as JSON with a `kind` discriminator; field
//! values are the armored ciphertext written as literal strings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::core::constants::{DEFAULT_FIELD, SECRET_KIND};
use crate::error::{Result, SecretError, ValidationError};

#[derive(Serialize, Deserialize)]
struct Wire {
    kind: String,
    #[serde(default)]
    payload: BTreeMap<String, String>,
}

fn field_name(key: Option<&str>) -> Result<&str> {
    match key {
        None => Ok(DEFAULT_FIELD),
        Some("") => Err(ValidationError::EmptyKey.into()),
        Some(k) => Ok(k),
    }
}

fn encode(payload: &BTreeMap<String, Vec<u8>>) -> Result<Vec<u8>> {
    let mut fields = BTreeMap::new();
    for (name, value) in payload {
        let text = std::str::from_utf8(value).map_err(|_| SecretError::NotText(name.clone()))?;
        fields.insert(name.clone(), text.to_string());
    }
    let wire = Wire {
        kind: SECRET_KIND.to_string(),
        payload: fields,
    };
    let mut out = serde_json::to_vec_pretty(&wire).map_err(|e| SecretError::Malformed {
        what: "secret",
        reason: e.to_string(),
    })?;
    out.push(b'\n');
    Ok(out)
}

fn decode(data: &[u8]) -> Result<BTreeMap<String, Vec<u8>>> {
    let wire: Wire = serde_json::from_slice(data).map_err(|e| SecretError::Malformed {
        what: "secret",
        reason: e.to_string(),
    })?;
    if wire.kind != SECRET_KIND {
        return Err(SecretError::UnexpectedKind {
            expected: SECRET_KIND,
            found: wire.kind,
        }
        .into());
    }
    Ok(wire
        .payload
        .into_iter()
        .map(|(k, v)| (k, v.into_bytes()))
        .collect())
}

/// A named record of encrypted fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Secret {
    payload: BTreeMap<String, Vec<u8>>,
}

/// One field handed back to a caller.
#[derive(Debug, Clone)]
pub struct SecretData {
    pub name: String,
    pub payload: Zeroizing<Vec<u8>>,
    pub default: bool,
}

impl SecretData {
    pub fn new(name: impl Into<String>, payload: Zeroizing<Vec<u8>>) -> Self {
        let name = name.into();
        let default = name == DEFAULT_FIELD;
        Self {
            name,
            payload,
            default,
        }
    }
}

impl Secret {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, overwriting any previous value. `None` means the
    /// default field.
    pub fn add_data(&mut self, key: Option<&str>, ciphertext: Vec<u8>) -> Result<()> {
        let name = field_name(key)?;
        self.payload.insert(name.to_string(), ciphertext);
        Ok(())
    }

    pub fn get_by_key(&self, key: Option<&str>) -> Option<&[u8]> {
        let name = field_name(key).ok()?;
        self.payload.get(name).map(Vec::as_slice)
    }

    /// Remove a field, returning whether it existed.
    pub fn remove(&mut self, key: Option<&str>) -> bool {
        match field_name(key) {
            Ok(name) => self.payload.remove(name).is_some(),
            Err(_) => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Fields sorted by name.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.payload.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        encode(&self.payload)
    }

    /// Parse a packed secret, rejecting payloads of any other kind.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(Self {
            payload: decode(data)?,
        })
    }
}

/// Plaintext form of a secret while the store is unpacked.
///
/// A secret whose only field is the default field is written as the bare
/// value so it can be edited as an ordinary file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSecret {
    Data(Zeroizing<Vec<u8>>),
    Fields(BTreeMap<String, Zeroizing<Vec<u8>>>),
}

impl RawSecret {
    /// Choose the representation for a set of decrypted fields.
    pub fn from_fields(mut fields: BTreeMap<String, Zeroizing<Vec<u8>>>) -> Self {
        if fields.len() == 1 {
            if let Some(data) = fields.remove(DEFAULT_FIELD) {
                return RawSecret::Data(data);
            }
        }
        RawSecret::Fields(fields)
    }

    /// Plaintext fields by name.
    pub fn into_fields(self) -> BTreeMap<String, Zeroizing<Vec<u8>>> {
        match self {
            RawSecret::Data(data) => BTreeMap::from([(DEFAULT_FIELD.to_string(), data)]),
            RawSecret::Fields(fields) => fields,
        }
    }

    /// Bytes written to disk while unpacked.
    pub fn serialize(&self) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            RawSecret::Data(data) => Ok(data.clone()),
            RawSecret::Fields(fields) => {
                let plain: BTreeMap<String, Vec<u8>> = fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_vec()))
                    .collect();
                encode(&plain).map(Zeroizing::new)
            }
        }
    }

    /// Structured content becomes fields; anything else is raw data.
    pub fn deserialize(data: &[u8]) -> Self {
        match decode(data) {
            Ok(fields) => RawSecret::Fields(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Zeroizing::new(v)))
                    .collect(),
            ),
            Err(_) => RawSecret::Data(Zeroizing::new(data.to_vec())),
        }
    }
}
