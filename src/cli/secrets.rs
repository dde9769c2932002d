//! Secret commands.

use std::io::{Read, Write};

use tracing::info;

use super::store::Context;
use crate::cli::output;
use crate::error::Result;

pub fn add(ctx: &Context, path: &str, value: Option<String>, key: Option<&str>) -> Result<()> {
    let data = match value {
        Some(value) => zeroize::Zeroizing::new(value.into_bytes()),
        None => {
            let mut buf = zeroize::Zeroizing::new(Vec::new());
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    info!(path, key = ?key, "adding secret");
    let mut store = ctx.open()?;
    store.session(|s| s.add(path, key, &data))?;
    output::success(&format!("added {}", output::path(path)));
    Ok(())
}

/// Print one field raw, or every field as `name: value`.
pub fn get(ctx: &Context, path: &str, key: Option<&str>) -> Result<()> {
    let store = ctx.open()?;
    let data = store.get(path, key)?;
    if data.is_empty() {
        output::warn(&format!("no secret at {}", path));
        return Ok(());
    }

    let mut stdout = std::io::stdout().lock();
    if let [single] = data.as_slice() {
        stdout.write_all(&single.payload)?;
        if !single.payload.ends_with(b"\n") {
            stdout.write_all(b"\n")?;
        }
        return Ok(());
    }
    for field in &data {
        write!(stdout, "{}: ", field.name)?;
        stdout.write_all(&field.payload)?;
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

pub fn rm(ctx: &Context, path: &str, key: Option<&str>) -> Result<()> {
    let mut store = ctx.open()?;
    store.session(|s| s.remove(path, key))?;
    output::success(&format!("removed {}", output::path(path)));
    Ok(())
}

pub fn cp(ctx: &Context, src: &str, dst: &str) -> Result<()> {
    let mut store = ctx.open()?;
    store.session(|s| s.copy(src, dst))?;
    output::success(&format!("copied {} to {}", output::path(src), output::path(dst)));
    Ok(())
}

pub fn mv(ctx: &Context, src: &str, dst: &str) -> Result<()> {
    let mut store = ctx.open()?;
    store.session(|s| s.rename(src, dst))?;
    output::success(&format!("moved {} to {}", output::path(src), output::path(dst)));
    Ok(())
}

pub fn ls(ctx: &Context, path: &str, json: bool) -> Result<()> {
    let store = ctx.open()?;
    let tree = store.list(path)?;

    if json {
        let result = serde_json::json!({
            "tree": tree,
            "paths": tree.leaf_paths(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&result).map_err(std::io::Error::other)?
        );
    } else if tree.is_empty() {
        output::dimmed("no secrets stored");
    } else {
        output::tree(&tree);
    }
    Ok(())
}
