//! Top-level error types for the CLI and library entry points.
//!
//! Bundler failures are wrapped here together with argument and
//! configuration errors so `main` has a single type to report.

use thiserror::Error;

/// Result type alias for top-level operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all top-level operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Bundler errors
    #[error("{0}")]
    Bundler(#[from] crate::bundler::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl BundlerError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        use crate::bundler::Error;

        let BundlerError::Bundler(inner) = self else {
            return vec!["Run with --help to see the accepted flags".to_string()];
        };

        match inner.root_cause() {
            Error::InputNotFound { .. } => {
                vec!["Check the --inputFile, --msiFile and --certFile paths".to_string()]
            }
            Error::CommandFailed { command, .. } => {
                let flag = match command.as_str() {
                    "7z" => "seven-zip",
                    other => other,
                };
                vec![format!("Install {command} or point --{flag} at it")]
            }
            Error::Timeout { .. } => vec!["Raise --tool-timeout or drop it".to_string()],
            Error::Unsupported { .. } => {
                vec!["Use --signer osslsigncode on non-Windows hosts".to_string()]
            }
            Error::Storage(_) | Error::Http(_) => {
                vec!["Check --storage-endpoint and the bucket/key names in the event".to_string()]
            }
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
