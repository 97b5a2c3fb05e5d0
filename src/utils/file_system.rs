use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Create a directory and all of its missing parents, does nothing if it already exists.
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    if !path.as_ref().is_dir() {
        fs::create_dir_all(path.as_ref()).with_context(|| {
            format!(
                "unable to create specified directory '{}'",
                path.as_ref().display()
            )
        })?;
    }
    Ok(())
}

/// Get the directory that contains the currently running binary.
pub fn parent_dir_of_cur_exe() -> Result<PathBuf> {
    let exe = env::current_exe().context("failed to get the path of current binary")?;
    exe.parent()
        .map(Path::to_path_buf)
        .with_context(|| format!("'{}' does not have a parent directory", exe.display()))
}

/// Get the file stem of the currently running binary in lowercase, such as `vcbuild`.
pub fn lowercase_program_name() -> Option<String> {
    let exe = env::current_exe().ok()?;
    let stem = exe.file_stem()?.to_str()?;
    Some(stem.to_lowercase())
}

/// Resolve the directory the build directories are created in,
/// which is the working directory at the time of invocation.
pub fn work_dir() -> Result<PathBuf> {
    env::current_dir().context("current directory cannot be determined")
}
