//! Git working-tree storage.
//!
//! Secrets are plain files inside a git working tree. History operations
//! shell out to the `git` binary. Every history read runs in its own git
//! process, so concurrent `get_latest` calls from the pack worker pool do
//! not share any in-process repository state and need no lock.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::{debug, trace};
use walkdir::WalkDir;

use super::path;
use super::{Entry, Storage, Tree};
use crate::core::constants::REMOTE_NAME;
use crate::error::{Result, StorageError};

const GIT_DIR: &str = ".git";

/// Storage backed by a local git repository.
#[derive(Debug, Clone)]
pub struct GitStorage {
    dir: PathBuf,
    git: PathBuf,
}

impl GitStorage {
    /// Whether `location` looks like a git working tree.
    pub fn detect(location: &Path) -> bool {
        location.join(GIT_DIR).exists()
    }

    fn locate_git() -> Result<PathBuf> {
        which::which("git").map_err(|_| StorageError::GitMissing.into())
    }

    /// Create a new repository at `dir`, optionally with an `origin` remote.
    pub fn init(dir: &Path, remote: Option<&str>) -> Result<Self> {
        if dir.exists() {
            return Err(StorageError::AlreadyExists(dir.display().to_string()).into());
        }
        let git = Self::locate_git()?;
        fs::create_dir_all(dir)
            .map_err(|e| StorageError::io("create", dir.display().to_string(), e))?;

        let storage = Self {
            dir: dir.to_path_buf(),
            git,
        };
        storage.run(&["init", "-q"])?;

        if let Some(remote) = remote {
            storage.add_remote(REMOTE_NAME, remote)?;
        }

        debug!(dir = %dir.display(), "git storage initialized");
        Ok(storage)
    }

    /// Clone a repository from `remote` into `dir`.
    pub fn clone_from(dir: &Path, remote: &str) -> Result<Self> {
        if dir.exists() {
            return Err(StorageError::AlreadyExists(dir.display().to_string()).into());
        }
        if let Some(parent) = dir.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError::io("create", parent.display().to_string(), e))?;
        }

        let git = Self::locate_git()?;
        let target = dir.display().to_string();
        let output = Command::new(&git)
            .args(["clone", "-q", "-o", REMOTE_NAME, remote, &target])
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|e| StorageError::io("run git clone in", target.clone(), e))?;
        if !output.status.success() {
            return Err(StorageError::Git {
                command: "clone".to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            git,
        })
    }

    /// Open an existing repository.
    pub fn open(dir: &Path) -> Result<Self> {
        if !Self::detect(dir) {
            return Err(StorageError::NotFound(dir.join(GIT_DIR).display().to_string()).into());
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            git: Self::locate_git()?,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Remove the local working tree entirely.
    pub fn destroy(self) -> Result<()> {
        fs::remove_dir_all(&self.dir)
            .map_err(|e| StorageError::io("remove", self.dir.display().to_string(), e).into())
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.git);
        cmd.current_dir(&self.dir)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            // secret names are file names, never pathspec magic
            .env("GIT_LITERAL_PATHSPECS", "1");
        cmd
    }

    /// Run git, returning its output whatever the exit status.
    fn run_raw(&self, args: &[&str]) -> Result<Output> {
        trace!(?args, "git");
        self.command(args)
            .output()
            .map_err(|e| StorageError::io("run git in", self.dir.display().to_string(), e).into())
    }

    /// Run git and fail on a non-zero exit status.
    fn run(&self, args: &[&str]) -> Result<Output> {
        let output = self.run_raw(args)?;
        if !output.status.success() {
            return Err(StorageError::Git {
                command: args.first().copied().unwrap_or_default().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(output)
    }

    fn stdout(output: &Output) -> String {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    fn has_head(&self) -> Result<bool> {
        Ok(self
            .run_raw(&["rev-parse", "--verify", "-q", "HEAD"])?
            .status
            .success())
    }

    fn current_branch(&self) -> Result<String> {
        let output = self.run(&["symbolic-ref", "--short", "HEAD"])?;
        Ok(Self::stdout(&output))
    }

    /// `-c` overrides supplying an author when git has none configured.
    fn author_overrides(&self) -> Result<Vec<String>> {
        let mut overrides = Vec::new();
        let configured = |key: &str| -> Result<bool> {
            let output = self.run_raw(&["config", key])?;
            Ok(output.status.success() && !Self::stdout(&output).is_empty())
        };

        let user = whoami::username();
        if !configured("user.name")? {
            overrides.push("-c".to_string());
            overrides.push(format!("user.name={}", user));
        }
        if !configured("user.email")? {
            let host = whoami::fallible::hostname().unwrap_or_else(|_| "localhost".to_string());
            overrides.push("-c".to_string());
            overrides.push(format!("user.email={}@{}", user, host));
        }
        Ok(overrides)
    }

    fn full_path(&self, p: &str) -> Result<(String, PathBuf)> {
        let normalized = path::normalize(p)?;
        let full = self.dir.join(&normalized);
        Ok((normalized, full))
    }

    /// Remove now-empty directories between `start` and the storage root.
    fn prune_empty_parents(&self, start: &Path) {
        let mut current = start.parent();
        while let Some(dir) = current {
            if dir == self.dir || !dir.starts_with(&self.dir) {
                break;
            }
            // remove_dir only succeeds on empty directories
            if fs::remove_dir(dir).is_err() {
                break;
            }
            current = dir.parent();
        }
    }

    fn ensure_parent(full: &Path, display: &str) -> Result<()> {
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError::io("create parent of", display.to_string(), e))?;
        }
        Ok(())
    }

    fn list_entries(dir: &Path) -> Result<Vec<Entry>> {
        let read = fs::read_dir(dir)
            .map_err(|e| StorageError::io("read dir", dir.display().to_string(), e))?;

        let mut entries = Vec::new();
        for item in read {
            let item = item.map_err(|e| StorageError::io("read dir", dir.display().to_string(), e))?;
            let name = item.file_name().to_string_lossy().to_string();
            if name == GIT_DIR {
                continue;
            }

            let file_type = item
                .file_type()
                .map_err(|e| StorageError::io("stat", item.path().display().to_string(), e))?;
            if file_type.is_dir() {
                let children = Self::list_entries(&item.path())?;
                // skip empty dirs
                if children.is_empty() {
                    continue;
                }
                entries.push(Entry::node(name, children));
            } else {
                entries.push(Entry::leaf(name));
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

impl Storage for GitStorage {
    fn name(&self) -> &'static str {
        "git"
    }

    fn store(&self, p: &str, data: &[u8]) -> Result<()> {
        let (normalized, full) = self.full_path(p)?;
        if full.is_dir() {
            return Err(StorageError::IsDirectory(normalized).into());
        }
        Self::ensure_parent(&full, &normalized)?;

        fs::write(&full, data).map_err(|e| StorageError::io("write", normalized, e))?;
        Ok(())
    }

    fn remove(&self, p: &str) -> Result<()> {
        let (normalized, full) = self.full_path(p)?;

        let metadata = match fs::symlink_metadata(&full) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(normalized).into());
            }
            Err(e) => return Err(StorageError::io("stat", normalized, e).into()),
        };

        let removed = if metadata.is_dir() {
            fs::remove_dir_all(&full)
        } else {
            fs::remove_file(&full)
        };
        removed.map_err(|e| StorageError::io("remove", normalized.clone(), e))?;

        self.prune_empty_parents(&full);
        debug!(path = %normalized, "removed");
        Ok(())
    }

    fn copy(&self, src: &str, dst: &str) -> Result<()> {
        let (src_norm, src_full) = self.full_path(src)?;
        let (dst_norm, dst_full) = self.full_path(dst)?;
        if src_norm == dst_norm {
            return Ok(());
        }
        if !src_full.exists() {
            return Err(StorageError::NotFound(src_norm).into());
        }

        // Collect first so copying a node into its own subtree terminates.
        let mut items = Vec::new();
        for item in WalkDir::new(&src_full).sort_by_file_name() {
            let item = item.map_err(|e| {
                StorageError::io("walk", src_norm.clone(), std::io::Error::other(e.to_string()))
            })?;
            let rel = item
                .path()
                .strip_prefix(&src_full)
                .map(Path::to_path_buf)
                .unwrap_or_default();
            items.push((item.path().to_path_buf(), rel, item.file_type().is_dir()));
        }

        for (from, rel, is_dir) in items {
            let to = if rel.as_os_str().is_empty() {
                dst_full.clone()
            } else {
                dst_full.join(&rel)
            };
            if is_dir {
                fs::create_dir_all(&to)
                    .map_err(|e| StorageError::io("create", dst_norm.clone(), e))?;
            } else {
                Self::ensure_parent(&to, &dst_norm)?;
                fs::copy(&from, &to).map_err(|e| StorageError::io("copy to", dst_norm.clone(), e))?;
            }
        }

        debug!(src = %src_norm, dst = %dst_norm, "copied");
        Ok(())
    }

    fn rename(&self, src: &str, dst: &str) -> Result<()> {
        let (src_norm, src_full) = self.full_path(src)?;
        let (dst_norm, dst_full) = self.full_path(dst)?;
        if src_norm == dst_norm {
            return Ok(());
        }
        if path::is_nested(&dst_norm, &src_norm) {
            return Err(StorageError::IntoItself {
                src: src_norm,
                dst: dst_norm,
            }
            .into());
        }
        if !src_full.exists() {
            return Err(StorageError::NotFound(src_norm).into());
        }

        // rename(2) refuses a non-empty target directory; merge instead
        if src_full.is_dir() && dst_full.is_dir() {
            self.copy(&src_norm, &dst_norm)?;
            return self.remove(&src_norm);
        }

        Self::ensure_parent(&dst_full, &dst_norm)?;
        fs::rename(&src_full, &dst_full)
            .map_err(|e| StorageError::io("move to", dst_norm.clone(), e))?;

        self.prune_empty_parents(&src_full);
        debug!(src = %src_norm, dst = %dst_norm, "moved");
        Ok(())
    }

    fn get(&self, p: &str) -> Result<Option<Vec<u8>>> {
        let (normalized, full) = self.full_path(p)?;

        match fs::metadata(&full) {
            Ok(m) if m.is_dir() => Err(StorageError::IsDirectory(normalized).into()),
            Ok(_) => fs::read(&full)
                .map(Some)
                .map_err(|e| StorageError::io("read", normalized, e).into()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io("stat", normalized, e).into()),
        }
    }

    fn get_latest(&self, p: &str) -> Result<Option<Vec<u8>>> {
        let normalized = path::normalize(p)?;

        // new repository without commits
        if !self.has_head()? {
            return Ok(None);
        }

        let listing = self.run(&["ls-tree", "-z", "HEAD", "--", &normalized])?;
        let raw = String::from_utf8_lossy(&listing.stdout);
        let Some(record) = raw.split('\0').find(|r| !r.is_empty()) else {
            return Ok(None);
        };

        // "<mode> <type> <object>\t<path>"
        let meta = record.split('\t').next().unwrap_or_default();
        let mut fields = meta.split_whitespace();
        let (_mode, kind, object) = (fields.next(), fields.next(), fields.next());
        match (kind, object) {
            (Some("blob"), Some(object)) => {
                let content = self.run(&["cat-file", "blob", object])?;
                trace!(path = %normalized, bytes = content.stdout.len(), "read committed blob");
                Ok(Some(content.stdout))
            }
            (Some("tree"), _) => Err(StorageError::IsDirectory(normalized).into()),
            _ => Ok(None),
        }
    }

    fn list(&self, p: &str) -> Result<Tree> {
        let normalized = path::normalize_root(p)?;
        let full = if normalized.is_empty() {
            self.dir.clone()
        } else {
            self.dir.join(&normalized)
        };

        match fs::metadata(&full) {
            Ok(m) if m.is_dir() => Ok(Tree::new(Self::list_entries(&full)?)),
            Ok(_) => Ok(Tree::default()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Tree::default()),
            Err(e) => Err(StorageError::io("stat", normalized, e).into()),
        }
    }

    fn add_remote(&self, name: &str, address: &str) -> Result<()> {
        self.run(&["remote", "add", name, address])?;
        Ok(())
    }

    fn has_remote(&self) -> Result<bool> {
        let output = self.run(&["remote"])?;
        Ok(!Self::stdout(&output).is_empty())
    }

    fn push(&self) -> Result<()> {
        if !self.has_remote()? {
            return Err(StorageError::NoRemote.into());
        }
        // nothing committed yet, nothing to push
        if !self.has_head()? {
            return Ok(());
        }

        let branch = self.current_branch()?;
        self.run(&["push", "-q", REMOTE_NAME, &branch])?;
        debug!(branch = %branch, "pushed");
        Ok(())
    }

    fn pull(&self) -> Result<()> {
        if !self.has_remote()? {
            return Err(StorageError::NoRemote.into());
        }
        self.run(&["fetch", "-q", REMOTE_NAME])?;

        let branch = self.current_branch()?;
        let tracking = format!("refs/remotes/{}/{}", REMOTE_NAME, branch);
        let remote_exists = self
            .run_raw(&["rev-parse", "--verify", "-q", &tracking])?
            .status
            .success();
        if !remote_exists {
            debug!(branch = %branch, "remote has no history yet");
            return Ok(());
        }

        if self.has_head()? {
            self.run(&["merge", "--ff-only", "-q", &tracking])?;
        } else {
            self.run(&["reset", "--hard", "-q", &tracking])?;
        }
        debug!(branch = %branch, "pulled");
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.run(&["add", "-A"])?;

        let status = self.run(&["status", "--porcelain"])?;
        if Self::stdout(&status).is_empty() {
            debug!("nothing to commit");
            return Ok(());
        }

        let overrides = self.author_overrides()?;
        let mut args: Vec<&str> = overrides.iter().map(String::as_str).collect();
        args.extend(["commit", "-q", "-m", message]);
        self.run(&args)?;

        debug!(message, "committed");
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        if self.has_head()? {
            self.run(&["reset", "--hard", "-q", "HEAD"])?;
        }
        self.run(&["clean", "-fdq"])?;
        debug!("rolled back uncommitted changes");
        Ok(())
    }
}
