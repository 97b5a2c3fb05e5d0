use std::ffi::OsStr;
use std::fmt::Debug;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use anyhow::{anyhow, Context, Result};

cfg_if::cfg_if! {
    if #[cfg(windows)] {
        const SHELL: &str = "cmd.exe";
        const START_ARG: &str = "/C";
    } else {
        const SHELL: &str = "sh";
        const START_ARG: &str = "-c";
    }
}

macro_rules! exec_err {
    ($p:expr, $args:expr, $ext_msg:expr) => {
        anyhow::anyhow!(
            "error occurred when executing command `{} {}`{}",
            $p.as_ref().to_string_lossy().to_string(),
            $args
                .iter()
                .map(|oss| oss.as_ref().to_string_lossy().to_string())
                .collect::<std::vec::Vec<_>>()
                .join(" "),
            $ext_msg
        )
    };
}

/// Captured result of a finished child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Run a program inside `cwd` with exactly the given environment variables,
/// stream its output to the console, and return its exit code.
///
/// # Platform specific behaviors:
/// - On Windows, this will launch a `cmd.exe` process and invoke the command there.
/// - On Linux, this invoke the command directly.
///
/// # Errors
///
/// This will return errors if the program cannot be launched, or if it
/// was terminated without an exit code (killed by a signal).
/// A non-zero exit code is NOT an error here, callers decide what it means.
pub fn execute_in<P, A, I, K, V>(program: P, args: &[A], cwd: &Path, envs: I) -> Result<i32>
where
    P: AsRef<OsStr> + Debug,
    A: AsRef<OsStr>,
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    cfg_if::cfg_if! {
        if #[cfg(windows)] {
            let mut command = Command::new(SHELL);
            command.arg(START_ARG).arg(&program);
        } else {
            let mut command = Command::new(&program);
        }
    }
    command
        .args(args)
        .current_dir(cwd)
        .env_clear()
        .envs(envs)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    hide_console(&mut command);

    let status = command
        .status()
        .with_context(|| exec_err!(program, args, ""))?;
    status.code().ok_or_else(|| {
        anyhow!(
            "failed to retrive exit code because the program {:?} was terminated by a signal",
            program.as_ref()
        )
    })
}

/// Run a program directly with exactly the given environment variables and capture its output.
///
/// # Errors
///
/// This will return errors if:
/// 1. The program cannot be launched.
/// 2. The program was terminated by a signal.
/// 3. Its output is not valid UTF-8.
pub fn capture_with_env<P, A, I, K, V>(program: P, args: &[A], envs: I) -> Result<CapturedOutput>
where
    P: AsRef<OsStr> + Debug,
    A: AsRef<OsStr>,
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut command = Command::new(program.as_ref());
    command.args(args).env_clear().envs(envs);
    hide_console(&mut command);

    let output = command
        .stdin(Stdio::null())
        .output()
        .with_context(|| exec_err!(program, args, ""))?;
    into_captured(output).with_context(|| exec_err!(program, args, ""))
}

/// Run a command line through the platform shell (`sh -c` on Unix, `cmd.exe /S /C` on Windows)
/// with exactly the given environment variables and capture its output.
///
/// The command line is handed to the shell untouched, so quoting is the caller's business.
///
/// # Errors
///
/// Same as [`capture_with_env`].
pub fn shell_capture_with_env<I, K, V>(cmdline: &str, envs: I) -> Result<CapturedOutput>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut command = Command::new(SHELL);
    cfg_if::cfg_if! {
        if #[cfg(windows)] {
            use std::os::windows::process::CommandExt;
            // `/S` makes cmd strip exactly the outer pair of quotes.
            command.raw_arg(format!("/S {START_ARG} \"{cmdline}\""));
        } else {
            command.arg(START_ARG).arg(cmdline);
        }
    }
    command.env_clear().envs(envs);
    hide_console(&mut command);

    let shell_err =
        || anyhow!("error occurred when executing command `{SHELL} {START_ARG} {cmdline}`");
    let output = command
        .stdin(Stdio::null())
        .output()
        .with_context(shell_err)?;
    into_captured(output).with_context(shell_err)
}

/// Quote a single word for `sh`, so that it reaches the script unchanged.
pub fn sh_quote(word: &str) -> String {
    format!("'{}'", word.replace('\'', r"'\''"))
}

fn into_captured(output: Output) -> Result<CapturedOutput> {
    let code = output
        .status
        .code()
        .ok_or_else(|| anyhow!("program was terminated by a signal"))?;
    let stdout = String::from_utf8(output.stdout).context("output was not valid UTF-8")?;
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    Ok(CapturedOutput {
        code,
        stdout,
        stderr,
    })
}

fn hide_console(_command: &mut Command) {
    // Prevent CMD window popup
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        _command.creation_flags(winapi::um::winbase::CREATE_NO_WINDOW);
    }
}
