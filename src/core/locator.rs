//! Find where the MSVC toolchain is installed.

use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, warn};

use super::env::{self, EnvMap};
use super::error::BuildError;
use crate::utils;

/// Environment variable pointing at the 32-bit program files directory,
/// which is where the Visual Studio installer keeps `vswhere.exe`.
pub const PROGRAM_FILES_X86: &str = "ProgramFiles(x86)";

/// Root directory of an installed toolchain, such as
/// `C:\Program Files\Microsoft Visual Studio\2022\Community`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainRoot(PathBuf);

impl ToolchainRoot {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Path to the script that sets up the compiler environment for a given architecture.
    pub fn setup_script(&self) -> PathBuf {
        ["VC", "Auxiliary", "Build", "vcvarsall.bat"]
            .iter()
            .fold(self.0.clone(), |path, part| path.join(part))
    }
}

/// Something that knows where a toolchain is installed.
pub trait ToolchainLocator {
    /// Resolve the toolchain installation root.
    ///
    /// `env` is the baseline environment of this program, implementations
    /// must read variables from it instead of the process environment.
    fn locate(&self, env: &EnvMap) -> Result<ToolchainRoot>;
}

/// Locate the latest Visual Studio installation (pre-releases included) with `vswhere.exe`.
#[derive(Debug, Default, Clone, Copy)]
pub struct VsWhere;

impl VsWhere {
    const ARGS: [&'static str; 4] = ["-prerelease", "-latest", "-property", "installationPath"];

    /// Path to `vswhere.exe`, which has a fixed location since Visual Studio 2017.
    pub fn program(env: &EnvMap) -> Result<PathBuf> {
        let program_files = env::lookup(env, PROGRAM_FILES_X86)
            .ok_or_else(|| BuildError::MissingEnvVar(PROGRAM_FILES_X86.to_string()))?;
        Ok(["Microsoft Visual Studio", "Installer", "vswhere.exe"]
            .iter()
            .fold(PathBuf::from(program_files), |path, part| path.join(part)))
    }
}

impl ToolchainLocator for VsWhere {
    fn locate(&self, env: &EnvMap) -> Result<ToolchainRoot> {
        let program = Self::program(env)?;
        debug!("querying toolchain location with '{}'", program.display());

        let output = utils::capture_with_env(&program, &Self::ARGS, env)?;
        if !output.success() {
            return Err(BuildError::Locator {
                program,
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            }
            .into());
        }

        let root = output.stdout.trim();
        if root.is_empty() {
            warn!("'{}' did not report any installation", program.display());
        }
        Ok(ToolchainRoot::new(root))
    }
}
