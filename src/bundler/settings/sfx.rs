//! Self-extracting installer metadata.

/// Default install title shown by the SFX stub.
pub const DEFAULT_TITLE: &str = "New Tab Setup";

/// Default product URL embedded in the Authenticode signature.
pub const DEFAULT_INSTALL_URL: &str = "https://newtabthemebuilder.com/";

/// Default program the SFX stub launches after extraction.
pub const DEFAULT_EXECUTE_FILE: &str = "msiexec.exe";

/// Default name of the installer at the archive root.
pub const DEFAULT_INSTALLER_NAME: &str = "NewTabSetup.msi";

/// GUI mode 2: extraction progress only, no prompts.
pub const DEFAULT_GUI_MODE: u8 = 2;

/// Install-time metadata for the produced executable.
///
/// Title and URL are per-theme values; they end up both in the SFX config
/// block and in the signature description.
///
/// # Configuration
///
/// ```toml
/// [sfx]
/// title = "Ocean Waves New Tab"
/// install_url = "https://newtabthemebuilder.com/ocean-waves"
/// installer_name = "NewTabSetup.msi"
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SfxSettings {
    /// Title shown in the extraction window and used as signature name.
    pub title: String,

    /// URL stored in the signature (`-i` of osslsigncode).
    pub install_url: String,

    /// Executable the stub runs after extracting.
    pub execute_file: String,

    /// Explicit parameters for `execute_file`.
    ///
    /// Default: None (uses `/i <installer_name>`)
    pub execute_parameters: Option<String>,

    /// File name the installer gets at the archive root.
    pub installer_name: String,

    /// 7-Zip SFX `GUIMode` value.
    pub gui_mode: u8,
}

impl Default for SfxSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            install_url: DEFAULT_INSTALL_URL.to_string(),
            execute_file: DEFAULT_EXECUTE_FILE.to_string(),
            execute_parameters: None,
            installer_name: DEFAULT_INSTALLER_NAME.to_string(),
            gui_mode: DEFAULT_GUI_MODE,
        }
    }
}

impl SfxSettings {
    /// Parameters passed to `execute_file`.
    pub fn execute_parameters(&self) -> String {
        self.execute_parameters
            .clone()
            .unwrap_or_else(|| format!("/i {}", self.installer_name))
    }
}
