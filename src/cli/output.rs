//! Shared CLI output helpers for consistent terminal output.
//!
//! Color scheme (respects NO_COLOR):
//! - Green: success, checkmarks
//! - Red: errors
//! - Yellow: warnings
//! - Cyan: paths, keys, hints
//! - Dimmed: secondary info

use std::fmt::Display;
use std::sync::atomic::{AtomicUsize, Ordering};

use console::{style, StyledObject, Term};

use crate::core::progress::Progress;
use crate::core::storage::{Entry, Tree};

/// Check if color output is disabled via NO_COLOR env var.
fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

fn paint<D: Display>(value: D, f: impl FnOnce(StyledObject<D>) -> StyledObject<D>) -> String {
    if colors_enabled() {
        f(style(value)).force_styling(true).to_string()
    } else {
        value.to_string()
    }
}

/// Print a success message with checkmark (green).
///
/// Example: `✓ added db/password`
pub fn success(msg: &str) {
    println!("{} {}", paint("✓", |s| s.green()), msg);
}

/// Print an error message to stderr (red).
pub fn error(msg: &str) {
    eprintln!("{} {}", paint("✗", |s| s.red()), msg);
}

/// Print a warning message to stderr (yellow).
pub fn warn(msg: &str) {
    eprintln!("{} {}", paint("⚠", |s| s.yellow()), msg);
}

/// Print a hint message to stderr (cyan).
///
/// Example: `→ run: stowage init`
pub fn hint(msg: &str) {
    eprintln!("{} {}", paint("→", |s| s.cyan()), paint(msg, |s| s.cyan()));
}

/// Print a key-value pair (label dimmed, value bold).
pub fn kv(label: &str, value: impl Display) {
    println!("  {}  {}", paint(label, |s| s.dim()), paint(value, |s| s.bold()));
}

/// Print a dimmed/secondary message.
pub fn dimmed(msg: &str) {
    println!("{}", paint(msg, |s| s.dim()));
}

/// Format a path in cyan for inline use.
pub fn path(p: &str) -> String {
    paint(p, |s| s.cyan())
}

/// Render a listing as an indented tree.
pub fn tree(tree: &Tree) {
    fn walk(entries: &[Entry], depth: usize) {
        for entry in entries {
            let indent = "  ".repeat(depth);
            if entry.is_leaf() {
                println!("{}{}", indent, entry.name);
            } else {
                println!("{}{}/", indent, paint(&entry.name, |s| s.cyan().bold()));
                walk(&entry.children, depth + 1);
            }
        }
    }
    walk(tree.entries(), 0);
}

/// Progress counter drawn on stderr, one line rewritten in place.
pub struct ProgressLine {
    label: &'static str,
    term: Term,
    total: AtomicUsize,
    done: AtomicUsize,
}

impl ProgressLine {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            term: Term::stderr(),
            total: Default::default(),
            done: Default::default(),
        }
    }

    fn draw(&self) {
        if !self.term.is_term() {
            return;
        }
        let line = format!(
            "{} {}/{}",
            paint(self.label, |s| s.dim()),
            self.done.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed)
        );
        let _ = self.term.clear_line();
        let _ = self.term.write_str(&line);
    }
}

impl Progress for ProgressLine {
    fn start(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        self.draw();
    }

    fn inc(&self) {
        self.done.fetch_add(1, Ordering::Relaxed);
        self.draw();
    }

    fn finish(&self) {
        if self.term.is_term() {
            let _ = self.term.clear_line();
        }
    }
}
