//! Settings file loading.
//!
//! A TOML file can hold the per-theme metadata and machine-specific tool
//! paths so they do not have to be repeated on every invocation:
//!
//! ```toml
//! [sfx]
//! title = "Ocean Waves New Tab"
//! install_url = "https://newtabthemebuilder.com/ocean-waves"
//!
//! [signing]
//! tool = "osslsigncode"
//!
//! [tools]
//! seven_zip = "/usr/bin/7za"
//! timeout_secs = 600
//! ```

use super::{PasswordTransport, SfxSettings, SigningSettings, SigningTool, ToolPaths};
use crate::bundler::error::{Error, ErrorExt, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Parsed settings file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    /// `[sfx]` table
    #[serde(default)]
    pub sfx: Option<SfxSection>,

    /// `[signing]` table
    #[serde(default)]
    pub signing: Option<SigningSection>,

    /// `[tools]` table
    #[serde(default)]
    pub tools: Option<ToolsSection>,
}

/// `[sfx]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SfxSection {
    pub title: Option<String>,
    pub install_url: Option<String>,
    pub execute_file: Option<String>,
    pub execute_parameters: Option<String>,
    pub installer_name: Option<String>,
    pub gui_mode: Option<u8>,
}

/// `[signing]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SigningSection {
    pub tool: Option<SigningTool>,
    pub timestamp_url: Option<String>,
    pub password_transport: Option<PasswordTransport>,
}

/// `[tools]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsSection {
    pub seven_zip: Option<PathBuf>,
    pub osslsigncode: Option<PathBuf>,
    pub signtool: Option<PathBuf>,
    pub sfx_module: Option<PathBuf>,
    pub openssl_modules: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl SettingsFile {
    /// Reads and parses a settings file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).fs_context("reading settings file", path)?;
        Self::parse(&content)
            .map_err(|e| Error::GenericError(format!("{}: {}", path.display(), e)))
    }

    /// Parses settings from TOML text.
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Overwrites the given settings with every key present in the file.
    pub fn apply(
        &self,
        sfx: &mut SfxSettings,
        signing: &mut SigningSettings,
        tools: &mut ToolPaths,
    ) {
        if let Some(section) = &self.sfx {
            set(&mut sfx.title, &section.title);
            set(&mut sfx.install_url, &section.install_url);
            set(&mut sfx.execute_file, &section.execute_file);
            set(&mut sfx.installer_name, &section.installer_name);
            set(&mut sfx.gui_mode, &section.gui_mode);
            if section.execute_parameters.is_some() {
                sfx.execute_parameters = section.execute_parameters.clone();
            }
        }

        if let Some(section) = &self.signing {
            if section.tool.is_some() {
                signing.tool = section.tool;
            }
            set(&mut signing.timestamp_url, &section.timestamp_url);
            set(&mut signing.password_transport, &section.password_transport);
        }

        if let Some(section) = &self.tools {
            set(&mut tools.seven_zip, &section.seven_zip);
            set(&mut tools.osslsigncode, &section.osslsigncode);
            set(&mut tools.signtool, &section.signtool);
            set(&mut tools.sfx_module, &section.sfx_module);
            if section.openssl_modules.is_some() {
                tools.openssl_modules = section.openssl_modules.clone();
            }
        }
    }
}

fn set<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}
