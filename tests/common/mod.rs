#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use vcbuild::EnvMap;

/// Build an [`EnvMap`] out of literal pairs.
pub fn env_of(pairs: &[(&str, &str)]) -> EnvMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// A scratch directory that lives as long as the test.
pub fn scratch() -> TempDir {
    tempfile::Builder::new()
        .prefix("vcbuild_test_")
        .tempdir()
        .expect("unable to create temp dir")
}

/// Write a `sh` script to `path`, creating missing parent directories,
/// and mark it as executable.
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    path.to_path_buf()
}

/// Read the lines a fake tool appended to its call log, empty if it was never called.
pub fn read_log(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|s| s.lines().map(ToOwned::to_owned).collect())
        .unwrap_or_default()
}
