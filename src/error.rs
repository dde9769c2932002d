//! Error types for stowage.
//!
//! Each concern has its own error enum; all of them fold into [`Error`]
//! so engine operations return a single error per call.

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("operation cancelled")]
    Cancelled,

    /// Two failures reported together, e.g. an operation error and the
    /// error of the commit or rollback that followed it.
    #[error("{0}; additionally: {1}")]
    Joined(Box<Error>, Box<Error>),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Combine an operation outcome with a follow-up outcome.
    ///
    /// Neither error masks the other: when both fail the result is
    /// [`Error::Joined`].
    pub fn join<T>(primary: Result<T>, secondary: Result<()>) -> Result<T> {
        match (primary, secondary) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(first), Err(second)) => Err(Error::Joined(Box::new(first), Box::new(second))),
        }
    }

    /// Whether this error (or any joined part of it) is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Error::Cancelled => true,
            Error::Joined(a, b) => a.is_cancelled() || b.is_cancelled(),
            _ => false,
        }
    }
}

/// Engine-level usage errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store is unpacked: pack it before modifying secrets")]
    Unpacked,

    #[error("store is packed: unpack it first")]
    Packed,

    #[error("access to store internal objects in {0}")]
    ReservedPath(String),

    #[error("manifest not found in storage at {0}")]
    ManifestNotFound(String),

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("manifest declares storage '{declared}' but location is '{detected}'")]
    StorageMismatch { declared: String, detected: String },
}

/// Secret lookup and (de)serialization errors.
#[derive(Error, Debug)]
pub enum SecretError {
    #[error("secret not found: {0}")]
    NotFound(String),

    #[error("field '{key}' not found in secret {path}")]
    FieldNotFound { path: String, key: String },

    #[error("unknown kind '{found}', expected '{expected}'")]
    UnexpectedKind {
        expected: &'static str,
        found: String,
    },

    #[error("malformed {what}: {reason}")]
    Malformed { what: &'static str, reason: String },

    #[error("field '{0}' is not valid UTF-8 and cannot be written as text")]
    NotText(String),

    #[error("failed to pack secret {path}: {source}")]
    Pack {
        path: String,
        #[source]
        source: Box<crate::error::Error>,
    },
}

/// Encryption and identity errors.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("no available identities found")]
    NoIdentities,

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("armor error: {0}")]
    ArmorFailed(String),

    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("unknown encryption '{0}'")]
    UnknownEncryption(String),

    #[error("unknown identity provider '{0}'")]
    UnknownProvider(String),
}

/// Versioned-storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("path is not local to the storage: {0}")]
    NotLocal(String),

    #[error("path not found in storage: {0}")]
    NotFound(String),

    #[error("found directory, not a file: {0}")]
    IsDirectory(String),

    #[error("path {0} already exists")]
    AlreadyExists(String),

    #[error("cannot move {src} into itself at {dst}")]
    IntoItself { src: String, dst: String },

    #[error("failed to {op} {path}: {source}")]
    Io {
        op: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    #[error("git executable not found")]
    GitMissing,

    #[error("storage has no remote")]
    NoRemote,

    #[error("unsupported storage type '{0}'")]
    Unsupported(String),
}

impl StorageError {
    pub(crate) fn io(op: &'static str, path: impl Into<String>, source: std::io::Error) -> Self {
        StorageError::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

/// Settings errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("unable to determine home directory")]
    NoHome,
}

/// Input validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("path cannot be empty")]
    EmptyPath,

    #[error("store requires at least one recipient")]
    NoRecipients,

    #[error("field name cannot be empty")]
    EmptyKey,

    #[error("file {path} has permissions {actual}, expected {expected}")]
    InvalidPermissions {
        path: String,
        expected: String,
        actual: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
