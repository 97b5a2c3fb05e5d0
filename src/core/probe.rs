//! Recover the environment a toolchain setup script produces.
//!
//! Setup scripts such as `vcvarsall.bat` do their work by mutating the
//! environment of the shell that runs them, there is no other output to read.
//! [`ShellProbe`] runs such a script in a throwaway shell session, dumps the
//! resulting environment and picks out the variables the compiler needs.

use std::path::Path;

use anyhow::Result;
use log::debug;

use super::env::EnvMap;
use super::error::BuildError;
use crate::utils;

/// Variables a setup script is expected to produce, compared case-insensitively.
pub const INTERESTING_VARS: [&str; 4] = ["INCLUDE", "LIB", "LIBPATH", "PATH"];

/// What a probe learned from running a setup script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Probed {
    /// The interesting variables, keyed by their uppercased name.
    pub delta: EnvMap,
    /// Raw diagnostic output of the probe.
    pub raw: String,
}

/// Runs a setup script for an architecture and reports the environment it produced.
pub trait EnvProbe {
    /// Run `script` with the architecture token `arch`, starting from `baseline`.
    fn probe(&self, script: &Path, arch: &str, baseline: &EnvMap) -> Result<Probed>;
}

/// Probe by running the script in the platform shell followed by the shell's
/// own environment listing (`set` for `cmd.exe`, `env` for `sh`).
///
/// The listing only runs when the script succeeded, and the session's exit code is checked,
/// so a failing setup script is reported instead of producing a partial environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellProbe;

impl ShellProbe {
    /// The command line handed to the shell.
    pub fn command_line(script: &Path, arch: &str) -> String {
        cfg_if::cfg_if! {
            if #[cfg(windows)] {
                format!("\"{}\" {arch} && set", script.display())
            } else {
                // `.` does not take arguments in every `sh`, so set the positionals first.
                format!(
                    "set -- {} && . {} && env",
                    utils::sh_quote(arch),
                    utils::sh_quote(&script.to_string_lossy())
                )
            }
        }
    }
}

impl EnvProbe for ShellProbe {
    fn probe(&self, script: &Path, arch: &str, baseline: &EnvMap) -> Result<Probed> {
        let harvest_err = |detail: String| BuildError::Harvest {
            script: script.to_path_buf(),
            arch: arch.to_string(),
            detail,
        };

        let cmdline = Self::command_line(script, arch);
        debug!("probing environment with `{cmdline}`");

        let output = utils::shell_capture_with_env(&cmdline, baseline)
            .map_err(|e| harvest_err(format!("{e:#}")))?;
        if !output.success() {
            return Err(harvest_err(format!(
                "setup script exited with code {}: {}",
                output.code,
                output.stderr.trim()
            ))
            .into());
        }

        Ok(Probed {
            delta: parse_env_dump(&output.stdout),
            raw: output.stdout,
        })
    }
}

/// Extract the [`INTERESTING_VARS`] from an environment listing of `NAME=VALUE` lines.
///
/// Lines without `=` are ignored. Only the first `=` separates name from value,
/// names are uppercased while values are kept as they are. If a variable appears more
/// than once, the last one wins.
pub fn parse_env_dump(dump: &str) -> EnvMap {
    dump.lines()
        .filter_map(|line| line.trim().split_once('='))
        .map(|(key, value)| (key.to_uppercase(), value))
        .filter(|(key, _)| INTERESTING_VARS.contains(&key.as_str()))
        .map(|(key, value)| (key, value.to_string()))
        .collect()
}
