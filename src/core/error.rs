use std::path::PathBuf;

use thiserror::Error;

use super::build::Step;

/// Failures of the build pipeline that callers may want to tell apart.
///
/// These are wrapped into [`anyhow::Error`] when propagated,
/// use `downcast_ref::<BuildError>()` to get them back.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("environment variable `{0}` is not set")]
    MissingEnvVar(String),
    #[error("toolchain locator `{program}` exited with code {code}: {stderr}")]
    Locator {
        program: PathBuf,
        code: i32,
        stderr: String,
    },
    #[error("failed to harvest environment from '{}' for `{arch}`: {detail}", .script.display())]
    Harvest {
        script: PathBuf,
        arch: String,
        detail: String,
    },
    #[error("{step} step failed in '{}' with exit code {code}", .dir.display())]
    Step { step: Step, dir: PathBuf, code: i32 },
}
