//! Domain types.

mod manifest;
mod oplog;
mod secret;

pub use manifest::Manifest;
pub use oplog::OperationLog;
pub use secret::{RawSecret, Secret, SecretData};
