//! Code signing settings.

use std::fmt;

/// Default RFC 3161 timestamp authority used with signtool.
pub const DEFAULT_TIMESTAMP_URL: &str = "http://timestamp.digicert.com";

/// External Authenticode signing tool.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningTool {
    /// `osslsigncode` with a PKCS#12 bundle. Works on every host.
    Osslsigncode,
    /// Microsoft `signtool.exe`. Windows only.
    Signtool,
}

impl SigningTool {
    /// Name of the tool as invoked and reported.
    pub fn name(self) -> &'static str {
        match self {
            SigningTool::Osslsigncode => "osslsigncode",
            SigningTool::Signtool => "signtool",
        }
    }
}

impl fmt::Display for SigningTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the certificate password reaches the signing tool.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PasswordTransport {
    /// Written to a transient owner-only file read with `-readpass`.
    ///
    /// signtool cannot read passwords from a file and always falls back to
    /// [`PasswordTransport::Argument`].
    #[default]
    TransientFile,

    /// Passed on the command line. Visible in process listings.
    Argument,
}

/// Signing configuration.
///
/// # Configuration
///
/// ```toml
/// [signing]
/// tool = "osslsigncode"
/// timestamp_url = "http://timestamp.digicert.com"
/// password_transport = "transient-file"
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningSettings {
    /// Explicit tool choice.
    ///
    /// Default: None (signtool on Windows, osslsigncode elsewhere)
    pub tool: Option<SigningTool>,

    /// Timestamp authority for signtool (`/tr`).
    pub timestamp_url: String,

    /// Password transport.
    pub password_transport: PasswordTransport,
}

impl Default for SigningSettings {
    fn default() -> Self {
        Self {
            tool: None,
            timestamp_url: DEFAULT_TIMESTAMP_URL.to_string(),
            password_transport: PasswordTransport::default(),
        }
    }
}
