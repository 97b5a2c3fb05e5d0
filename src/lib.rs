#![deny(unused_must_use)]

pub mod cli;
mod core;
pub mod utils;

// Exports
pub use crate::core::build::{BuildPlan, BuildRunner, CommandRunner, Step, SystemRunner, Toolset};
pub use crate::core::env::{self as environment, EnvMap};
pub use crate::core::error::BuildError;
pub use crate::core::locator::{ToolchainLocator, ToolchainRoot, VsWhere, PROGRAM_FILES_X86};
pub use crate::core::probe::{parse_env_dump, EnvProbe, Probed, ShellProbe, INTERESTING_VARS};
pub use crate::core::{Arch, Orchestrator, DEFAULT_BUILD_TYPE};
