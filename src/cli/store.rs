//! Store location and lifecycle commands.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::cli::output;
use crate::core::cipher::Recipient;
use crate::core::config::Settings;
use crate::core::identity::Keyring;
use crate::core::storage::StorageType;
use crate::core::store::{InitOptions, Store};
use crate::error::Result;

/// Settings plus the resolved store location for one invocation.
pub struct Context {
    pub settings: Settings,
    pub location: PathBuf,
}

impl Context {
    pub fn load(store: Option<PathBuf>) -> Result<Self> {
        let settings = Settings::load()?;
        let location = store.unwrap_or_else(|| settings.store.clone());
        Ok(Self { settings, location })
    }

    pub fn keyring(&self) -> Keyring {
        Keyring::new(&self.settings.identities)
    }

    pub fn open(&self) -> Result<Store> {
        Store::open(&self.location, Arc::new(self.keyring()), &self.settings)
    }
}

/// Create a store, saving a generated identity into the keyring.
pub fn init(ctx: &Context, recipients: Vec<String>, remote: Option<String>) -> Result<()> {
    info!(location = %ctx.location.display(), "initializing store");
    let options = InitOptions {
        recipients: recipients.into_iter().map(Recipient::new).collect(),
        remote,
        ..Default::default()
    };

    let outcome = Store::init(&ctx.location, options)?;
    output::success(&format!(
        "initialized store at {}",
        output::path(&outcome.path.display().to_string())
    ));

    if let Some(identity) = outcome.identity {
        let saved = ctx.keyring().save(&identity)?;
        output::kv("recipient:", identity.recipient());
        output::kv("identity:", saved.display());
    }
    Ok(())
}

pub fn clone(ctx: &Context, remote: &str) -> Result<()> {
    let store = Store::clone_from(
        &ctx.location,
        remote,
        StorageType::Git,
        Arc::new(ctx.keyring()),
    )?;
    output::success(&format!(
        "cloned store into {}",
        output::path(&ctx.location.display().to_string())
    ));

    let keyring = ctx.keyring().list()?;
    if !store
        .manifest()
        .recipients()
        .iter()
        .any(|r| keyring.contains(r))
    {
        output::warn("no identity in the keyring can decrypt this store");
    }
    Ok(())
}
