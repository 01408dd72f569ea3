//! SFX configuration block.
//!
//! The 7-Zip SFX stub scans for the block between `;!@Install@!UTF-8!` and
//! `;!@InstallEnd@!` right after its own image. Values are quoted and may not
//! contain quotes or line breaks; the stub has no escaping.

use crate::bundler::{
    error::{Error, Result},
    settings::SfxSettings,
};
use handlebars::Handlebars;
use std::collections::BTreeMap;

/// Opening marker recognised by the stub.
pub const BEGIN_MARKER: &str = ";!@Install@!UTF-8!";

/// Closing marker recognised by the stub.
pub const END_MARKER: &str = ";!@InstallEnd@!";

const CONFIG_TEMPLATE: &str = "
;!@Install@!UTF-8!
Title=\"{{title}}\"
ExecuteFile=\"{{execute_file}}\"
ExecuteParameters=\"{{execute_parameters}}\"
GUIMode=\"{{gui_mode}}\"
;!@InstallEnd@!
";

/// Install instructions embedded between the stub and the archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigBlock {
    pub title: String,
    pub execute_file: String,
    pub execute_parameters: String,
    pub gui_mode: u8,
}

impl ConfigBlock {
    /// Builds the block from installer metadata.
    pub fn from_settings(sfx: &SfxSettings) -> Self {
        Self {
            title: sfx.title.clone(),
            execute_file: sfx.execute_file.clone(),
            execute_parameters: sfx.execute_parameters(),
            gui_mode: sfx.gui_mode,
        }
    }

    /// Renders the block text.
    ///
    /// # Errors
    ///
    /// Fails if a value contains `"`, `\r` or `\n`, which would end the
    /// value early or break the block apart.
    pub fn render(&self) -> Result<String> {
        let mut data = BTreeMap::new();
        for (key, value) in [
            ("title", &self.title),
            ("execute_file", &self.execute_file),
            ("execute_parameters", &self.execute_parameters),
        ] {
            if value.contains(['"', '\r', '\n']) {
                return Err(Error::GenericError(format!(
                    "SFX config value {key} may not contain quotes or line breaks: {value:?}"
                )));
            }
            data.insert(key, value.clone());
        }
        data.insert("gui_mode", self.gui_mode.to_string());

        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
            .render_template(CONFIG_TEMPLATE, &data)
            .map_err(|e| Error::GenericError(format!("failed to render SFX config: {}", e)))
    }
}
