//! Stowage - version-controlled, multi-recipient encrypted secret store.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stowage::cli::output;
use stowage::cli::{execute, Cli};
use stowage::error::{CipherError, Error, StorageError, StoreError};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("STOWAGE_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("stowage=debug")
        } else {
            EnvFilter::new("stowage=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = execute(cli.command, cli.store) {
        let suggestion = match &e {
            Error::Storage(StorageError::NotFound(_)) => Some("run: stowage init"),
            Error::Store(StoreError::Unpacked) => Some("run: stowage pack"),
            Error::Store(StoreError::Packed) => Some("run: stowage unpack"),
            Error::Cipher(CipherError::NoIdentities) => {
                Some("ask a store member to add your recipient")
            }
            Error::Storage(StorageError::GitMissing) => Some("install git"),
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
