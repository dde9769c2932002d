//! Command-line interface.

pub mod output;
mod pack;
mod secrets;
mod store;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;

/// Stowage - version-controlled, multi-recipient encrypted secret store.
#[derive(Parser)]
#[command(
    name = "stowage",
    about = "Version-controlled, multi-recipient encrypted secret store",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Store location (defaults to the `store` setting)
    #[arg(long, global = true, env = "STOWAGE_STORE")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Create a new store
    Init {
        /// Recipient public key (repeatable); a new identity is generated if omitted
        #[arg(short, long = "recipient")]
        recipients: Vec<String>,
        /// Remote address registered as origin
        #[arg(long)]
        remote: Option<String>,
    },

    /// Clone a store from a remote
    Clone {
        /// Remote address
        remote: String,
    },

    /// Add or overwrite a secret field
    Add {
        /// Secret path
        path: String,
        /// Value; read from stdin when omitted
        value: Option<String>,
        /// Field name (defaults to the default field)
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Print a secret
    Get {
        /// Secret path
        path: String,
        /// Only this field
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Remove a secret, a subtree, or one field
    Rm {
        /// Secret path
        path: String,
        /// Only this field
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Copy a secret or subtree
    Cp { src: String, dst: String },

    /// Move a secret or subtree
    Mv { src: String, dst: String },

    /// List secrets
    Ls {
        /// Subtree to list
        #[arg(default_value = "")]
        path: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Encrypt an unpacked store back
    Pack {
        /// Re-encrypt every value instead of keeping unchanged ciphertext
        #[arg(long)]
        skip_changes_check: bool,
    },

    /// Write every secret as plaintext for editing
    Unpack,

    /// Pull from and push to the remote
    Sync,

    /// Discard uncommitted changes
    Rollback,
}

/// Execute a command.
pub fn execute(command: Command, store: Option<PathBuf>) -> Result<()> {
    use Command::*;

    let ctx = store::Context::load(store)?;
    match command {
        Init { recipients, remote } => store::init(&ctx, recipients, remote),
        Clone { remote } => store::clone(&ctx, &remote),
        Add { path, value, key } => secrets::add(&ctx, &path, value, key.as_deref()),
        Get { path, key } => secrets::get(&ctx, &path, key.as_deref()),
        Rm { path, key } => secrets::rm(&ctx, &path, key.as_deref()),
        Cp { src, dst } => secrets::cp(&ctx, &src, &dst),
        Mv { src, dst } => secrets::mv(&ctx, &src, &dst),
        Ls { path, json } => secrets::ls(&ctx, &path, json),
        Pack { skip_changes_check } => pack::pack(&ctx, skip_changes_check),
        Unpack => pack::unpack(&ctx),
        Sync => pack::sync(&ctx),
        Rollback => pack::rollback(&ctx),
    }
}
