//! Shared helpers for `taskboard` integration tests.
//!
//! Every `TestEnv` owns a private preference file and a working directory, so
//! tests never touch the user's real preferences and can run in parallel.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
pub use tempfile::TempDir;

pub struct TestEnv {
    pub work_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// A `TestEnv` whose work directory is already an active directory.
    pub fn with_active_dir() -> Self {
        let env = Self::new();
        env.taskboard()
            .args(["dirs", "add"])
            .arg(env.work_path())
            .assert()
            .success();
        env
    }

    /// The `taskboard` binary with an isolated preference file.
    pub fn taskboard(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_taskboard"));
        cmd.current_dir(self.work_dir.path());
        cmd.env("TASKBOARD_PREFS", self.prefs_path());
        cmd.env_remove("GITHUB_TOKEN");
        cmd.env_remove("TASKBOARD_GITHUB_ENDPOINT");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    pub fn work_path(&self) -> &Path {
        self.work_dir.path()
    }

    pub fn prefs_path(&self) -> PathBuf {
        self.config_dir.path().join("preferences.json")
    }

    pub fn list_path(&self, stem: &str) -> PathBuf {
        self.work_path().join(format!("{stem}.tasklist.json"))
    }

    pub fn read_list(&self, stem: &str) -> serde_json::Value {
        let raw = std::fs::read_to_string(self.list_path(stem)).unwrap();
        serde_json::from_str(&raw).unwrap()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
