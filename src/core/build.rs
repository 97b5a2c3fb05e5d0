//! Configure and build one build directory.

use std::env::consts::EXE_SUFFIX;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::info;

use super::env::EnvMap;
use super::error::BuildError;
use crate::utils;

/// The two stages of a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Configure,
    Build,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Configure => "configure",
            Self::Build => "build",
        })
    }
}

/// Programs used for each stage, and the layout they expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolset {
    /// Meta build system, invoked for [`Step::Configure`].
    pub configure: String,
    /// Build system, invoked for [`Step::Build`].
    pub build: String,
    /// Generator name passed to the meta build system.
    pub generator: String,
    /// Source root, relative to the build directory.
    pub source_dir: String,
}

impl Default for Toolset {
    fn default() -> Self {
        Self {
            configure: format!("cmake{EXE_SUFFIX}"),
            build: format!("ninja{EXE_SUFFIX}"),
            generator: "Ninja".into(),
            source_dir: "..".into(),
        }
    }
}

/// Everything needed to build one architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub dir: PathBuf,
    pub build_type: String,
    pub targets: Vec<String>,
    pub env: EnvMap,
}

impl BuildPlan {
    fn configure_args(&self, toolset: &Toolset) -> Vec<String> {
        vec![
            format!("-DCMAKE_BUILD_TYPE={}", self.build_type),
            format!("-G{}", toolset.generator),
            toolset.source_dir.clone(),
        ]
    }
}

/// Launches the programs of a build.
pub trait CommandRunner {
    /// Run `program` inside `cwd` with exactly `env` as its environment and return its exit code.
    ///
    /// A non-zero exit code is not an error at this level.
    fn run(&self, program: &str, args: &[String], cwd: &Path, env: &EnvMap) -> Result<i32>;
}

/// Runs programs as real child processes, sharing this program's console.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path, env: &EnvMap) -> Result<i32> {
        utils::execute_in(program, args, cwd, env)
    }
}

/// Runs the configure step followed by the build step of a [`BuildPlan`].
pub struct BuildRunner<'a> {
    toolset: Toolset,
    runner: &'a dyn CommandRunner,
}

impl<'a> BuildRunner<'a> {
    pub fn new(toolset: Toolset, runner: &'a dyn CommandRunner) -> Self {
        Self { toolset, runner }
    }

    /// Build `plan`, consuming it.
    ///
    /// # Errors
    ///
    /// Fails if the build directory cannot be created, a program cannot be launched,
    /// or either step exits with a non-zero code, in which case the remaining steps are skipped.
    pub fn run(&self, plan: BuildPlan) -> Result<()> {
        utils::ensure_dir(&plan.dir)?;

        let configure_args = plan.configure_args(&self.toolset);
        self.step(Step::Configure, &self.toolset.configure, &configure_args, &plan)?;
        self.step(Step::Build, &self.toolset.build, &plan.targets, &plan)
    }

    fn step(&self, step: Step, program: &str, args: &[String], plan: &BuildPlan) -> Result<()> {
        info!("running {step} step: {program} {}", args.join(" "));
        let code = self.runner.run(program, args, &plan.dir, &plan.env)?;
        if code != 0 {
            return Err(BuildError::Step {
                step,
                dir: plan.dir.clone(),
                code,
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Records every call, and answers with a fixed exit code per program.
    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<(String, Vec<String>, PathBuf, EnvMap)>>,
        failing: Option<(&'static str, i32)>,
    }

    impl Recorder {
        fn failing(program: &'static str, code: i32) -> Self {
            Self {
                failing: Some((program, code)),
                ..Default::default()
            }
        }

        fn count(&self, program: &str) -> usize {
            self.calls
                .borrow()
                .iter()
                .filter(|(p, ..)| p == program)
                .count()
        }
    }

    impl CommandRunner for Recorder {
        fn run(&self, program: &str, args: &[String], cwd: &Path, env: &EnvMap) -> Result<i32> {
            assert!(cwd.is_dir(), "build directory must exist before running tools");
            self.calls.borrow_mut().push((
                program.to_string(),
                args.to_vec(),
                cwd.to_path_buf(),
                env.clone(),
            ));
            Ok(match self.failing {
                Some((p, code)) if p == program => code,
                _ => 0,
            })
        }
    }

    fn toolset() -> Toolset {
        Toolset {
            configure: "cmake".into(),
            build: "ninja".into(),
            ..Default::default()
        }
    }

    fn plan(dir: PathBuf) -> BuildPlan {
        BuildPlan {
            dir,
            build_type: "RelWithDebInfo".into(),
            targets: vec!["b".into(), "a".into(), "c".into()],
            env: [("PATH".to_string(), "tools".to_string())].into_iter().collect(),
        }
    }

    #[test]
    fn configure_then_build() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("out").join("cmake-build-relwithdebinfo-64");
        let recorder = Recorder::default();

        BuildRunner::new(toolset(), &recorder)
            .run(plan(dir.clone()))
            .unwrap();

        let calls = recorder.calls.borrow();
        assert_eq!(calls.len(), 2);

        let (program, args, cwd, env) = &calls[0];
        assert_eq!(program, "cmake");
        assert_eq!(args, &["-DCMAKE_BUILD_TYPE=RelWithDebInfo", "-GNinja", ".."]);
        assert_eq!(cwd, &dir);
        assert_eq!(env["PATH"], "tools");

        let (program, args, cwd, env) = &calls[1];
        assert_eq!(program, "ninja");
        assert_eq!(args, &["b", "a", "c"]);
        assert_eq!(cwd, &dir);
        assert_eq!(env["PATH"], "tools");
    }

    #[test]
    fn failed_configure_skips_build() {
        let tmp = tempfile::tempdir().unwrap();
        let recorder = Recorder::failing("cmake", 1);

        let err = BuildRunner::new(toolset(), &recorder)
            .run(plan(tmp.path().join("build")))
            .unwrap_err();

        assert_eq!(recorder.count("cmake"), 1);
        assert_eq!(recorder.count("ninja"), 0);
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::Step {
                step: Step::Configure,
                code: 1,
                ..
            })
        ));
    }

    #[test]
    fn failed_build_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let recorder = Recorder::failing("ninja", 2);

        let err = BuildRunner::new(toolset(), &recorder)
            .run(plan(tmp.path().join("build")))
            .unwrap_err();

        assert_eq!(recorder.count("cmake"), 1);
        assert_eq!(recorder.count("ninja"), 1);
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::Step {
                step: Step::Build,
                code: 2,
                ..
            })
        ));
    }

    #[test]
    fn existing_build_dir_is_reused() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("build");
        let recorder = Recorder::default();
        let runner = BuildRunner::new(toolset(), &recorder);

        runner.run(plan(dir.clone())).unwrap();
        runner.run(plan(dir)).unwrap();

        assert_eq!(recorder.count("cmake"), 2);
        assert_eq!(recorder.count("ninja"), 2);
    }

    #[test]
    fn default_toolset() {
        let toolset = Toolset::default();
        assert_eq!(toolset.configure, format!("cmake{EXE_SUFFIX}"));
        assert_eq!(toolset.build, format!("ninja{EXE_SUFFIX}"));
        assert_eq!(toolset.generator, "Ninja");
        assert_eq!(toolset.source_dir, "..");
    }
}
