//! Contains all the definition of command line arguments.

use anyhow::Result;
use clap::Parser;

use crate::core::build::{BuildRunner, SystemRunner, Toolset};
use crate::core::locator::VsWhere;
use crate::core::probe::ShellProbe;
use crate::core::{env, Orchestrator, DEFAULT_BUILD_TYPE};
use crate::utils;

/// Build the project for x64 and x86 with the latest installed MSVC toolchain.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct VcBuild {
    /// Enable verbose output
    #[arg(hide = true, short, long, conflicts_with = "quiet")]
    pub verbose: bool,
    /// Suppress non-critical messages
    #[arg(hide = true, short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// CMake build type
    #[arg(long, value_name = "TYPE", default_value = DEFAULT_BUILD_TYPE)]
    pub build_type: String,
}

impl VcBuild {
    pub fn execute(&self) -> Result<()> {
        // Take the baseline before anything else could touch the environment.
        let baseline = env::snapshot();
        utils::Logger::new()
            .verbose(self.verbose)
            .quiet(self.quiet)
            .setup()?;

        let runner = SystemRunner;
        Orchestrator::new(
            &self.build_type,
            baseline,
            &VsWhere,
            &ShellProbe,
            BuildRunner::new(Toolset::default(), &runner),
        )
        .work_dir(utils::work_dir()?)
        .run()
    }
}

pub fn parse_cli() -> VcBuild {
    VcBuild::parse()
}

pub fn run() -> Result<()> {
    parse_cli().execute()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_type_defaults_to_release() {
        let cli = VcBuild::try_parse_from(["vcbuild"]).unwrap();
        assert_eq!(cli.build_type, "Release");
        assert!(!cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn build_type_is_free_form() {
        let cli = VcBuild::try_parse_from(["vcbuild", "--build-type", "MinSizeRel"]).unwrap();
        assert_eq!(cli.build_type, "MinSizeRel");
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        assert!(VcBuild::try_parse_from(["vcbuild", "-v", "-q"]).is_err());
    }

    #[test]
    fn no_positional_args() {
        assert!(VcBuild::try_parse_from(["vcbuild", "x64"]).is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        VcBuild::command().debug_assert();
    }
}
