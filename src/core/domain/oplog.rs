//! Session operation log.
//!
//! Every mutation appends a line; closing the store commits once with the
//! joined lines as the message.

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationLog {
    entries: Vec<String>,
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Commit message for the session.
    pub fn message(&self) -> String {
        self.entries.join("; ")
    }

    pub fn add(&mut self, path: &str, key: Option<&str>) {
        match key {
            Some(key) => self.push(format!("Add secret at {} to {}", key, path)),
            None => self.push(format!("Add {}", path)),
        }
    }

    pub fn copy(&mut self, src: &str, dst: &str) {
        self.push(format!("Copy {} to {}", src, dst));
    }

    pub fn rename(&mut self, src: &str, dst: &str) {
        self.push(format!("Move {} to {}", src, dst));
    }

    pub fn remove(&mut self, path: &str, key: Option<&str>) {
        match key {
            Some(key) => self.push(format!("Remove {} at {}", path, key)),
            None => self.push(format!("Remove {}", path)),
        }
    }

    pub fn remove_empty(&mut self, path: &str) {
        self.push(format!("Remove {}, since it's empty", path));
    }

    pub fn pack(&mut self) {
        self.push("Pack store");
    }
}
