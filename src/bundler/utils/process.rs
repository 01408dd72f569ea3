//! External tool execution.
//!
//! Every external program the pipeline runs is described as an
//! [`Invocation`] and handed to a [`ToolRunner`]. [`SystemRunner`] spawns real
//! processes; tests substitute a runner that emulates the tools.

use crate::bundler::error::{Error, Result};
use std::{
    ffi::{OsStr, OsString},
    fmt,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};
use tokio::io::AsyncReadExt;

/// Number of trailing stderr bytes kept for error messages.
const STDERR_TAIL: usize = 2048;

/// A fully described external tool call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    tool: &'static str,
    program: PathBuf,
    args: Vec<OsString>,
    envs: Vec<(OsString, OsString)>,
    secret_args: Vec<usize>,
}

impl Invocation {
    /// Starts an invocation of `program`, reported as `tool`.
    pub fn new(tool: &'static str, program: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            secret_args: Vec::new(),
        }
    }

    /// Appends an argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Appends an argument that must never be logged.
    pub fn secret_arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.secret_args.push(self.args.len());
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Sets an environment variable on the child process only.
    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    /// Tool name used in logs and errors.
    pub fn tool(&self) -> &'static str {
        self.tool
    }

    /// Program to spawn.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Raw arguments, secrets included.
    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Arguments as lossy strings, secrets included. Test and tool-emulation helper.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// Child-only environment variables.
    pub fn get_envs(&self) -> &[(OsString, OsString)] {
        &self.envs
    }

    /// Returns the value following `flag`, if present.
    pub fn value_after(&self, flag: &str) -> Option<&OsStr> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(OsString::as_os_str)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for (i, arg) in self.args.iter().enumerate() {
            if self.secret_args.contains(&i) {
                f.write_str(" ****")?;
            } else {
                write!(f, " {}", arg.to_string_lossy())?;
            }
        }
        Ok(())
    }
}

/// Runs external tools to completion.
///
/// Success means the process exited with status zero. Implementations must
/// not return before the process has finished.
#[allow(async_fn_in_trait)]
pub trait ToolRunner {
    /// Runs the invocation and waits for it.
    async fn run(&self, invocation: &Invocation) -> Result<()>;
}

/// Spawns real processes with `tokio::process`.
#[derive(Clone, Debug, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    /// Creates a runner that waits indefinitely.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner that kills tools running longer than `timeout`.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl ToolRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<()> {
        log::debug!("Running {}", invocation);

        let mut command = tokio::process::Command::new(invocation.program());
        command
            .args(invocation.get_args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in invocation.get_envs() {
            command.env(key, value);
        }

        let mut child = command.spawn().map_err(|error| Error::CommandFailed {
            command: invocation.tool().to_string(),
            error,
        })?;

        let mut stderr_pipe = child.stderr.take();
        let wait = async {
            let mut stderr = Vec::new();
            if let Some(pipe) = stderr_pipe.as_mut() {
                // A read failure only loses diagnostics, not the exit status.
                let _ = pipe.read_to_end(&mut stderr).await;
            }
            let status = child.wait().await;
            (status, stderr)
        };

        let (status, stderr) = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, wait).await {
                Ok(done) => done,
                Err(_elapsed) => {
                    log::error!(
                        "{} timed out after {}s, terminating",
                        invocation.tool(),
                        limit.as_secs()
                    );
                    return Err(Error::Timeout {
                        command: invocation.tool().to_string(),
                        timeout: limit,
                    });
                }
            },
            None => wait.await,
        };

        let status = status.map_err(|error| Error::CommandFailed {
            command: invocation.tool().to_string(),
            error,
        })?;

        if !status.success() {
            let tail_start = stderr.len().saturating_sub(STDERR_TAIL);
            return Err(Error::CommandStatus {
                command: invocation.tool().to_string(),
                code: status.code(),
                stderr: String::from_utf8_lossy(&stderr[tail_start..]).into_owned(),
            });
        }

        log::debug!("{} finished successfully", invocation.tool());
        Ok(())
    }
}
