//! In-process versioned storage.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::path;
use super::{Entry, Storage, Tree};
use crate::error::{Result, StorageError};

#[derive(Debug, Default)]
struct State {
    working: BTreeMap<String, Vec<u8>>,
    committed: BTreeMap<String, Vec<u8>>,
    history: Vec<String>,
    remotes: Vec<(String, String)>,
}

impl State {
    /// Keys at `normalized` or below it.
    fn subtree(&self, normalized: &str) -> Vec<String> {
        self.working
            .keys()
            .filter(|k| k.as_str() == normalized || path::is_nested(k, normalized))
            .cloned()
            .collect()
    }

    fn has_children(&self, normalized: &str) -> bool {
        self.working.keys().any(|k| path::is_nested(k, normalized))
    }
}

/// Versioned storage held entirely in memory.
///
/// Directories are implicit: a node exists while some leaf lies under it.
/// Push and pull succeed without doing anything once a remote is added.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: RwLock<State>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit messages, oldest first.
    pub fn commits(&self) -> Vec<String> {
        self.state.read().history.clone()
    }

    /// Whether the working set differs from the last commit.
    pub fn is_dirty(&self) -> bool {
        let state = self.state.read();
        state.working != state.committed
    }
}

fn build(keys: &[&str]) -> Vec<Entry> {
    let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let mut leaves = Vec::new();
    for key in keys {
        match key.split_once('/') {
            Some((head, rest)) => groups.entry(head).or_default().push(rest),
            None => leaves.push(*key),
        }
    }

    let mut entries: Vec<Entry> = leaves.into_iter().map(Entry::leaf).collect();
    for (name, rest) in groups {
        entries.push(Entry::node(name, build(&rest)));
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

impl Storage for MemoryStorage {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn store(&self, p: &str, data: &[u8]) -> Result<()> {
        let normalized = path::normalize(p)?;
        let mut state = self.state.write();
        if state.has_children(&normalized) {
            return Err(StorageError::IsDirectory(normalized).into());
        }
        state.working.insert(normalized, data.to_vec());
        Ok(())
    }

    fn remove(&self, p: &str) -> Result<()> {
        let normalized = path::normalize(p)?;
        let mut state = self.state.write();
        let keys = state.subtree(&normalized);
        if keys.is_empty() {
            return Err(StorageError::NotFound(normalized).into());
        }
        for key in keys {
            state.working.remove(&key);
        }
        Ok(())
    }

    fn copy(&self, src: &str, dst: &str) -> Result<()> {
        let src = path::normalize(src)?;
        let dst = path::normalize(dst)?;
        if src == dst {
            return Ok(());
        }

        let mut state = self.state.write();
        let keys = state.subtree(&src);
        if keys.is_empty() {
            return Err(StorageError::NotFound(src).into());
        }

        let copies: Vec<(String, Vec<u8>)> = keys
            .into_iter()
            .filter_map(|key| {
                let target = format!("{}{}", dst, &key[src.len()..]);
                state.working.get(&key).map(|data| (target, data.clone()))
            })
            .collect();
        for (target, data) in copies {
            state.working.insert(target, data);
        }
        Ok(())
    }

    fn rename(&self, src: &str, dst: &str) -> Result<()> {
        let src = path::normalize(src)?;
        let dst = path::normalize(dst)?;
        if src == dst {
            return Ok(());
        }
        if path::is_nested(&dst, &src) {
            return Err(StorageError::IntoItself { src, dst }.into());
        }

        let mut state = self.state.write();
        let keys = state.subtree(&src);
        if keys.is_empty() {
            return Err(StorageError::NotFound(src).into());
        }

        for key in keys {
            if let Some(data) = state.working.remove(&key) {
                let target = format!("{}{}", dst, &key[src.len()..]);
                state.working.insert(target, data);
            }
        }
        Ok(())
    }

    fn get(&self, p: &str) -> Result<Option<Vec<u8>>> {
        let normalized = path::normalize(p)?;
        let state = self.state.read();
        if state.has_children(&normalized) {
            return Err(StorageError::IsDirectory(normalized).into());
        }
        Ok(state.working.get(&normalized).cloned())
    }

    fn get_latest(&self, p: &str) -> Result<Option<Vec<u8>>> {
        let normalized = path::normalize(p)?;
        Ok(self.state.read().committed.get(&normalized).cloned())
    }

    fn list(&self, p: &str) -> Result<Tree> {
        let normalized = path::normalize_root(p)?;
        let state = self.state.read();

        let keys: Vec<&str> = if normalized.is_empty() {
            state.working.keys().map(String::as_str).collect()
        } else {
            state
                .working
                .keys()
                .filter(|k| path::is_nested(k, &normalized))
                .map(|k| &k[normalized.len() + 1..])
                .collect()
        };
        Ok(Tree::new(build(&keys)))
    }

    fn add_remote(&self, name: &str, address: &str) -> Result<()> {
        self.state
            .write()
            .remotes
            .push((name.to_string(), address.to_string()));
        Ok(())
    }

    fn has_remote(&self) -> Result<bool> {
        Ok(!self.state.read().remotes.is_empty())
    }

    fn push(&self) -> Result<()> {
        if !self.has_remote()? {
            return Err(StorageError::NoRemote.into());
        }
        Ok(())
    }

    fn pull(&self) -> Result<()> {
        if !self.has_remote()? {
            return Err(StorageError::NoRemote.into());
        }
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        let mut state = self.state.write();
        if state.working == state.committed {
            return Ok(());
        }
        state.committed = state.working.clone();
        state.history.push(message.to_string());
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        let mut state = self.state.write();
        state.working = state.committed.clone();
        Ok(())
    }
}
