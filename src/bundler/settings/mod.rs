//! Configuration structures for pipeline runs.
//!
//! This module provides the configuration types for building a signed SFX
//! installer: installer metadata, signing options, tool locations, and the
//! builder and settings-file loader that assemble them.

mod builder;
mod core;
mod file;
mod host;
mod sfx;
mod signing;
mod tools;

// Re-export all public types
pub use builder::SettingsBuilder;
pub use core::Settings;
pub use file::{SettingsFile, SfxSection, SigningSection, ToolsSection};
pub use host::HostOs;
pub use sfx::{
    DEFAULT_EXECUTE_FILE, DEFAULT_GUI_MODE, DEFAULT_INSTALL_URL, DEFAULT_INSTALLER_NAME,
    DEFAULT_TITLE, SfxSettings,
};
pub use signing::{DEFAULT_TIMESTAMP_URL, PasswordTransport, SigningSettings, SigningTool};
pub use tools::{FUNCTION_LAYER_BIN, FUNCTION_LAYER_OPENSSL_MODULES, ToolPaths};
