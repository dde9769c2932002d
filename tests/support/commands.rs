//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a stowage command with an isolated environment.
    ///
    /// Returns a Command configured with:
    /// - STOWAGE_HOME (and HOME) set to the temporary home directory
    /// - colors disabled and no inherited store override
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("stowage").expect("failed to find stowage binary");
        cmd.env("STOWAGE_HOME", self.home.path());
        cmd.env("HOME", self.home.path());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("STOWAGE_STORE");
        cmd.env_remove("STOWAGE_LOG");
        cmd.current_dir(self.home.path());
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.cmd()
            .args(args)
            .output()
            .unwrap_or_else(|e| panic!("failed to run stowage {:?}: {}", args, e))
    }

    /// Shortcut for `stowage init`.
    pub fn init_cmd(&self, extra: &[&str]) -> Output {
        let mut args = vec!["init"];
        args.extend_from_slice(extra);
        self.run(&args)
    }

    /// Shortcut for `stowage add <path> <value>`.
    pub fn add(&self, path: &str, value: &str) -> Output {
        self.run(&["add", path, value])
    }

    /// Shortcut for `stowage add <path> --key <key> <value>`.
    pub fn add_field(&self, path: &str, key: &str, value: &str) -> Output {
        self.run(&["add", path, "--key", key, value])
    }

    /// Shortcut for `stowage get <path>`.
    pub fn get(&self, path: &str) -> Output {
        self.run(&["get", path])
    }

    /// Shortcut for `stowage rm <path>`.
    pub fn rm(&self, path: &str) -> Output {
        self.run(&["rm", path])
    }

    /// Shortcut for `stowage ls --json`.
    pub fn ls_json(&self) -> Output {
        self.run(&["ls", "--json"])
    }

    /// Leaf paths reported by `stowage ls --json`.
    pub fn paths(&self) -> Vec<String> {
        let output = self.ls_json();
        assert!(output.status.success(), "ls failed");
        let json: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("ls output is not JSON");
        json["paths"]
            .as_array()
            .expect("paths array")
            .iter()
            .map(|p| p.as_str().expect("path string").to_string())
            .collect()
    }

    /// Run an arbitrary stowage command.
    pub fn stowage(&self, args: &[&str]) -> Output {
        self.run(args)
    }
}
