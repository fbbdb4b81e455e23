//! Common test helpers shared across integration tests

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(dead_code)] // Not all helpers are used by every test file

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Path of the compiled demo binary
pub fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_taskman-demo"))
}

/// Helper to create a temporary directory for tests
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Helper to write a task source file into a directory
pub fn create_source(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("tasks.rs");
    fs::write(&path, content).unwrap();
    path
}

/// Helper to create a Command isolated from the caller's environment
pub fn test_command() -> Command {
    let mut cmd = Command::new(get_binary_path());
    cmd.env("NO_COLOR", "1")
        .env_remove("TASKMAN_SOURCE")
        .env_remove("TASKMAN_LOG");
    cmd
}

/// Run the demo binary with `args` and capture its output
pub fn run_demo(args: &[&str]) -> Output {
    test_command()
        .args(args)
        .output()
        .expect("Failed to execute command")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
