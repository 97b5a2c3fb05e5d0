//! Core functionalities of this program
//!
//! Including toolchain discovery, environment probing and build sequencing.

pub mod build;
pub mod env;
pub mod error;
pub mod locator;
pub mod probe;

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, info};

use build::{BuildPlan, BuildRunner};
use env::EnvMap;
use locator::ToolchainLocator;
use probe::EnvProbe;

/// Build type used when none was given.
pub const DEFAULT_BUILD_TYPE: &str = "Release";

/// Target architectures, built one after another in the order of [`Arch::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X64,
    X86,
}

impl Arch {
    pub const ALL: [Arch; 2] = [Arch::X64, Arch::X86];

    /// Token understood by the setup script.
    pub fn token(self) -> &'static str {
        match self {
            Self::X64 => "x64",
            Self::X86 => "x86",
        }
    }

    pub fn bits(self) -> &'static str {
        match self {
            Self::X64 => "64",
            Self::X86 => "32",
        }
    }

    /// Build targets for this architecture, in build order.
    ///
    /// The configuration tool (`spicetools_cfg`) only exists as a 32-bit target.
    pub fn targets(self) -> &'static [&'static str] {
        match self {
            Self::X64 => &[
                "spicetools_stubs_kbt64",
                "spicetools_stubs_kld64",
                "spicetools_spice64",
            ],
            Self::X86 => &[
                "spicetools_stubs_kbt",
                "spicetools_stubs_kld",
                "spicetools_cfg",
                "spicetools_spice",
            ],
        }
    }

    /// Name of the build directory for `build_type`, such as `cmake-build-release-64`.
    pub fn build_dir_name(self, build_type: &str) -> String {
        format!("cmake-build-{}-{}", build_type.to_lowercase(), self.bits())
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Drives the whole build: locate the toolchain once, then probe, merge and build
/// every architecture in turn. The first failure stops everything.
pub struct Orchestrator<'a> {
    build_type: String,
    work_dir: PathBuf,
    baseline: EnvMap,
    locator: &'a dyn ToolchainLocator,
    probe: &'a dyn EnvProbe,
    runner: BuildRunner<'a>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        build_type: &str,
        baseline: EnvMap,
        locator: &'a dyn ToolchainLocator,
        probe: &'a dyn EnvProbe,
        runner: BuildRunner<'a>,
    ) -> Self {
        Self {
            build_type: build_type.to_string(),
            work_dir: PathBuf::from("."),
            baseline,
            locator,
            probe,
            runner,
        }
    }

    /// Set the directory that build directories are created in.
    pub fn work_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn build_dir(&self, arch: Arch) -> PathBuf {
        self.work_dir.join(arch.build_dir_name(&self.build_type))
    }

    pub fn run(&self) -> Result<()> {
        let root = self.locator.locate(&self.baseline)?;
        let script = root.setup_script();
        println!("{}", script.display());

        for arch in Arch::ALL {
            self.build_arch(arch, &script)?;
        }
        Ok(())
    }

    fn build_arch(&self, arch: Arch, script: &Path) -> Result<()> {
        info!("Building {arch}");

        let probed = self.probe.probe(script, arch.token(), &self.baseline)?;
        debug!("environment dump for {arch}:\n{}", probed.raw);
        for (key, val) in &probed.delta {
            debug!("{key}={val}");
        }

        let plan = BuildPlan {
            dir: self.build_dir(arch),
            build_type: self.build_type.clone(),
            targets: arch.targets().iter().map(ToString::to_string).collect(),
            env: env::merge(&self.baseline, &probed.delta),
        };
        self.runner.run(plan)
    }
}
