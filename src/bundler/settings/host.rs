//! Host operating system classification.

use std::fmt;

/// Operating system family the pipeline runs on.
///
/// Only the Windows / non-Windows split matters: it decides which signing
/// tool is available and where 7-Zip is usually installed.
///
/// # Examples
///
/// ```no_run
/// use sfx_bundler::bundler::HostOs;
///
/// let host = HostOs::current();
/// println!("Running on {}", host);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostOs {
    /// Microsoft Windows - signtool and Program Files tool locations
    Windows,
    /// Linux, macOS and other Unix-likes - osslsigncode only
    Other,
}

impl HostOs {
    /// Returns the OS this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            HostOs::Windows
        } else {
            HostOs::Other
        }
    }

    /// Returns true for Windows hosts.
    pub fn is_windows(self) -> bool {
        self == HostOs::Windows
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostOs::Windows => f.write_str("Windows"),
            HostOs::Other => f.write_str("a non-Windows host"),
        }
    }
}
