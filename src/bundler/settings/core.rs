//! Core Settings struct and implementations.

use super::{HostOs, SfxSettings, SigningSettings, ToolPaths};
use std::time::Duration;

/// Main settings for pipeline runs.
///
/// Central configuration for the bundler, constructed via [`SettingsBuilder`].
/// Holds installer metadata, signing options, tool locations and the host
/// the pipeline targets. Per-job secrets (the certificate password) are not
/// part of settings; they travel with the job inputs.
///
/// # Examples
///
/// ```no_run
/// use sfx_bundler::bundler::{SettingsBuilder, SfxSettings};
///
/// # fn example() -> sfx_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .sfx(SfxSettings {
///         title: "Ocean Waves New Tab".into(),
///         ..Default::default()
///     })
///     .build()?;
/// # Ok(())
/// # }
/// ```
///
/// # See Also
///
/// - [`SettingsBuilder`] - Builder for constructing Settings
/// - [`SfxSettings`] - Installer metadata
/// - [`SigningSettings`] - Signing configuration
///
/// [`SettingsBuilder`]: super::SettingsBuilder
#[derive(Clone, Debug)]
pub struct Settings {
    sfx: SfxSettings,
    signing: SigningSettings,
    tools: ToolPaths,
    host: HostOs,

    /// Upper bound for each external tool invocation.
    ///
    /// None means wait indefinitely.
    tool_timeout: Option<Duration>,
}

impl Settings {
    /// Returns the installer metadata.
    pub fn sfx(&self) -> &SfxSettings {
        &self.sfx
    }

    /// Returns the signing configuration.
    pub fn signing(&self) -> &SigningSettings {
        &self.signing
    }

    /// Returns the tool locations.
    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    /// Returns the host the pipeline runs on.
    pub fn host(&self) -> HostOs {
        self.host
    }

    /// Returns the per-invocation tool timeout.
    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tool_timeout
    }

    /// Returns the install title.
    pub fn title(&self) -> &str {
        &self.sfx.title
    }

    /// Returns the installer file name at the archive root.
    pub fn installer_name(&self) -> &str {
        &self.sfx.installer_name
    }

    /// Returns a copy with per-job metadata overrides applied.
    pub fn with_overrides(
        &self,
        title: Option<&str>,
        install_url: Option<&str>,
        execute_file: Option<&str>,
    ) -> Self {
        let mut settings = self.clone();
        if let Some(title) = title {
            settings.sfx.title = title.to_string();
        }
        if let Some(url) = install_url {
            settings.sfx.install_url = url.to_string();
        }
        if let Some(file) = execute_file {
            settings.sfx.execute_file = file.to_string();
        }
        settings
    }

    /// Creates a new Settings instance (used by SettingsBuilder).
    pub(super) fn new(
        sfx: SfxSettings,
        signing: SigningSettings,
        tools: ToolPaths,
        host: HostOs,
        tool_timeout: Option<Duration>,
    ) -> Self {
        Self {
            sfx,
            signing,
            tools,
            host,
            tool_timeout,
        }
    }
}
