//! Builder for constructing Settings.

use super::{HostOs, Settings, SettingsFile, SfxSettings, SigningSettings, ToolPaths};
use crate::bundler::error::{Error, Result};
use std::time::Duration;

/// Builder for constructing [`Settings`].
///
/// Provides a fluent API for building pipeline settings with validation.
///
/// # Examples
///
/// ```no_run
/// use sfx_bundler::bundler::{HostOs, SettingsBuilder, ToolPaths};
///
/// # fn example() -> sfx_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .host(HostOs::Other)
///     .tools(ToolPaths::function_layer())
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    sfx: SfxSettings,
    signing: SigningSettings,
    tools: Option<ToolPaths>,
    host: Option<HostOs>,
    tool_timeout: Option<Duration>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets installer metadata.
    ///
    /// Default: [`SfxSettings::default`]
    pub fn sfx(mut self, sfx: SfxSettings) -> Self {
        self.sfx = sfx;
        self
    }

    /// Sets signing configuration.
    ///
    /// Default: [`SigningSettings::default`]
    pub fn signing(mut self, signing: SigningSettings) -> Self {
        self.signing = signing;
        self
    }

    /// Sets tool locations.
    ///
    /// Default: [`ToolPaths::detect`] for the configured host
    pub fn tools(mut self, tools: ToolPaths) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Sets the host OS.
    ///
    /// Default: [`HostOs::current`]
    pub fn host(mut self, host: HostOs) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets the per-invocation timeout for external tools.
    ///
    /// Default: None (no timeout)
    pub fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = Some(timeout);
        self
    }

    /// Applies values from a parsed settings file.
    ///
    /// Only keys present in the file replace the current values. Call this
    /// before the individual setters so explicit values win.
    pub fn merge_file(mut self, file: &SettingsFile) -> Self {
        let host = self.host.unwrap_or_else(HostOs::current);
        let mut tools = self.tools.take().unwrap_or_else(|| ToolPaths::detect(host));
        file.apply(&mut self.sfx, &mut self.signing, &mut tools);
        if let Some(secs) = file.tools.as_ref().and_then(|t| t.timeout_secs) {
            self.tool_timeout = Some(Duration::from_secs(secs));
        }
        self.tools = Some(tools);
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata is unusable:
    /// - empty `title` or `installer_name`
    /// - `installer_name` containing a path separator
    /// - a zero `tool_timeout`
    pub fn build(self) -> Result<Settings> {
        if self.sfx.title.trim().is_empty() {
            return Err(Error::GenericError("sfx title must not be empty".into()));
        }
        let name = &self.sfx.installer_name;
        if name.trim().is_empty() || name.contains(['/', '\\']) {
            return Err(Error::GenericError(format!(
                "installer name must be a plain file name, got {name:?}"
            )));
        }
        if self.tool_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::GenericError("tool timeout must be positive".into()));
        }

        let host = self.host.unwrap_or_else(HostOs::current);
        let tools = self.tools.unwrap_or_else(|| ToolPaths::detect(host));

        Ok(Settings::new(self.sfx, self.signing, tools, host, self.tool_timeout))
    }
}
