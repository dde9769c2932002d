//! Pack, unpack, sync and rollback commands.

use super::store::Context;
use crate::cli::output;
use crate::core::cancel::Cancel;
use crate::core::store::PackOptions;
use crate::error::Result;

pub fn unpack(ctx: &Context) -> Result<()> {
    let mut store = ctx.open()?;
    let progress = output::ProgressLine::new("decrypting");
    store.session(|s| s.unpack(&Cancel::new(), &progress))?;

    output::success(&format!(
        "unpacked into {}",
        output::path(&ctx.location.display().to_string())
    ));
    output::hint("edit the files, then run: stowage pack");
    Ok(())
}

pub fn pack(ctx: &Context, skip_changes_check: bool) -> Result<()> {
    let mut store = ctx.open()?;
    let progress = output::ProgressLine::new("encrypting");
    let options = PackOptions { skip_changes_check };
    store.session(|s| s.pack(options, &Cancel::new(), &progress))?;

    output::success("packed");
    Ok(())
}

pub fn sync(ctx: &Context) -> Result<()> {
    let store = ctx.open()?;
    store.sync()?;
    output::success("synchronized");
    Ok(())
}

pub fn rollback(ctx: &Context) -> Result<()> {
    let mut store = ctx.open()?;
    store.rollback()?;
    output::success("uncommitted changes discarded");
    Ok(())
}
