//! Error types for bundler operations.
//!
//! Every failure inside the packaging pipeline ends up as an [`Error`]. The
//! [`Context`] and [`ErrorExt`] helpers attach the operation and path that
//! failed so the single top-level report is actionable.

use super::builder::JobStage;
use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
    time::Duration,
};

/// Result type alias for bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Bundler error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Free-form failure.
    #[error("{0}")]
    GenericError(String),

    /// Filesystem failure with the operation and path that caused it.
    #[error("{context} ({}): {error}", path.display())]
    Fs {
        /// Operation being performed
        context: String,
        /// Path the operation was applied to
        path: PathBuf,
        /// Underlying error
        error: io::Error,
    },

    /// A required job input is missing or is not a regular file.
    #[error("{what} not found: {}", path.display())]
    InputNotFound {
        /// Which input (e.g. "installer file")
        what: &'static str,
        /// Path that was looked up
        path: PathBuf,
    },

    /// An external tool could not be spawned.
    #[error("failed to run {command}: {error}")]
    CommandFailed {
        /// Tool name
        command: String,
        /// Spawn error
        error: io::Error,
    },

    /// An external tool exited unsuccessfully.
    #[error(
        "{command} exited with status {}{}",
        exit_code(code),
        stderr_suffix(stderr)
    )]
    CommandStatus {
        /// Tool name
        command: String,
        /// Exit code, `None` when killed by a signal
        code: Option<i32>,
        /// Tail of the tool's stderr
        stderr: String,
    },

    /// An external tool exceeded the configured timeout.
    #[error("{command} did not finish within {}s", timeout.as_secs())]
    Timeout {
        /// Tool name
        command: String,
        /// Configured limit
        timeout: Duration,
    },

    /// A tool exited zero but the file it should have produced is missing.
    #[error("{command} reported success but did not produce {}", path.display())]
    MissingOutput {
        /// Tool name
        command: String,
        /// Expected output
        path: PathBuf,
    },

    /// The requested operation is not available on this host.
    #[error("{what} is not supported on {host}")]
    Unsupported {
        /// Operation or tool
        what: String,
        /// Host description
        host: String,
    },

    /// The staged tree does not have the layout the SFX config expects.
    #[error("staged tree at {} is malformed: {reason}", root.display())]
    InvalidLayout {
        /// Staging root
        root: PathBuf,
        /// What is wrong
        reason: String,
    },

    /// Object storage failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A pipeline stage failed. This is the pipeline's only failure state.
    #[error("{stage} failed: {source}")]
    Stage {
        /// Stage that was running
        stage: JobStage,
        /// Cause
        source: Box<Error>,
    },

    /// Error with additional context.
    #[error("{context}: {source}")]
    Context {
        /// What was being attempted
        context: String,
        /// Cause
        source: Box<Error>,
    },
}

fn exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "unknown".to_string(), |c| c.to_string())
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.trim().is_empty() {
        String::new()
    } else {
        format!(": {}", stderr.trim())
    }
}

impl Error {
    /// Returns the innermost error, skipping stage and context wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Stage { source, .. } | Error::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns the pipeline stage this error was raised in, if any.
    pub fn stage(&self) -> Option<JobStage> {
        match self {
            Error::Stage { stage, .. } => Some(*stage),
            Error::Context { source, .. } => source.stage(),
            _ => None,
        }
    }
}

/// Adds context to fallible values.
pub trait Context<T> {
    /// Wraps the error with a message.
    fn context<C: Display>(self, context: C) -> Result<T>;

    /// Lazily computed variant of [`Context::context`].
    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> Context<T> for std::result::Result<T, E> {
    fn context<C: Display>(self, context: C) -> Result<T> {
        self.map_err(|e| Error::Context {
            context: context.to_string(),
            source: Box::new(e.into()),
        })
    }

    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T> {
        self.map_err(|e| Error::Context {
            context: f().to_string(),
            source: Box::new(e.into()),
        })
    }
}

/// Filesystem context for IO results.
pub trait ErrorExt<T> {
    /// Attaches the operation and the path it touched.
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context: context.to_string(),
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Returns early with a [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($($arg)*)).into())
    };
}
