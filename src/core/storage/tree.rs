//! Hierarchical listing of storage paths.

use std::collections::BTreeMap;

use serde::Serialize;

use super::path;

/// A node in a listing: a leaf (one secret) or an interior node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Entry>,
}

impl Entry {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn node(name: impl Into<String>, children: Vec<Entry>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Ordered list of top-level entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tree(Vec<Entry>);

impl Tree {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drop top-level entries matching `reject`.
    pub fn without(mut self, reject: impl Fn(&str) -> bool) -> Self {
        self.0.retain(|e| !reject(&e.name));
        self
    }

    /// Flat, sorted mapping of every leaf path to its entry.
    pub fn inline(&self) -> BTreeMap<String, &Entry> {
        let mut out = BTreeMap::new();
        collect(&mut out, "", &self.0);
        out
    }

    /// Every leaf path, sorted.
    pub fn leaf_paths(&self) -> Vec<String> {
        self.inline().into_keys().collect()
    }
}

fn collect<'a>(out: &mut BTreeMap<String, &'a Entry>, base: &str, entries: &'a [Entry]) {
    for entry in entries {
        let p = path::join(base, &entry.name);
        if entry.is_leaf() {
            out.insert(p, entry);
        } else {
            collect(out, &p, &entry.children);
        }
    }
}

impl IntoIterator for Tree {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
