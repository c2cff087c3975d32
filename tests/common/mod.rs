//! Common test utilities

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory with a brisk.yml file
pub fn create_test_build(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let build_path = temp_dir.path().join("brisk.yml");
    fs::write(&build_path, content).unwrap();
    (temp_dir, build_path)
}

/// Create a build file plus an empty subdirectory to run from
pub fn create_test_build_with_subdir(content: &str) -> (TempDir, PathBuf, PathBuf) {
    let (temp_dir, build_path) = create_test_build(content);
    let sub_dir = temp_dir.path().join("subdir");
    fs::create_dir(&sub_dir).unwrap();
    (temp_dir, build_path, sub_dir)
}

/// The brisk binary with log output silenced unless asked for
pub fn brisk() -> Command {
    let mut cmd = Command::cargo_bin("brisk").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}
