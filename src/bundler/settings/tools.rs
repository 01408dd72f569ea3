//! Locations of the external tools the pipeline shells out to.

use super::HostOs;
use std::path::PathBuf;

/// Directory holding tools in the cloud function runtime layer.
pub const FUNCTION_LAYER_BIN: &str = "/opt/bin";

/// OpenSSL provider modules shipped with the cloud function runtime layer.
pub const FUNCTION_LAYER_OPENSSL_MODULES: &str = "/opt/lib";

/// Paths of the external programs and the SFX stub.
///
/// Bare names (e.g. `7za`) are resolved through `PATH` when spawned.
///
/// # Configuration
///
/// ```toml
/// [tools]
/// seven_zip = "/usr/bin/7za"
/// osslsigncode = "/usr/local/bin/osslsigncode"
/// sfx_module = "vendor/7zSD.sfx"
/// openssl_modules = "/usr/lib/ossl-modules"
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolPaths {
    /// 7-Zip command line (`7za`, `7z` or `7z.exe`).
    pub seven_zip: PathBuf,

    /// osslsigncode executable.
    pub osslsigncode: PathBuf,

    /// signtool executable (Windows only).
    pub signtool: PathBuf,

    /// 7-Zip SFX stub (`7zSD.sfx`) prepended to the archive.
    pub sfx_module: PathBuf,

    /// Directory exported as `OPENSSL_MODULES` to osslsigncode only.
    ///
    /// Default: None (child inherits whatever the environment has)
    pub openssl_modules: Option<PathBuf>,
}

impl ToolPaths {
    /// Discovers tools on the current machine.
    ///
    /// Looks in the usual Windows install locations first and falls back to
    /// `PATH` lookups. The SFX stub defaults to `7zSD.sfx` in the working
    /// directory.
    pub fn detect(host: HostOs) -> Self {
        use crate::bundler::builder::tool_detection::{
            find_osslsigncode, find_seven_zip, find_signtool,
        };

        Self {
            seven_zip: find_seven_zip(host),
            osslsigncode: find_osslsigncode(),
            signtool: find_signtool(host),
            sfx_module: PathBuf::from("7zSD.sfx"),
            openssl_modules: None,
        }
    }

    /// Fixed layout of the cloud function runtime, no discovery.
    pub fn function_layer() -> Self {
        let bin = PathBuf::from(FUNCTION_LAYER_BIN);
        Self {
            seven_zip: bin.join("7za"),
            osslsigncode: bin.join("osslsigncode"),
            signtool: PathBuf::from("signtool"),
            sfx_module: bin.join("7zSD.sfx"),
            openssl_modules: Some(PathBuf::from(FUNCTION_LAYER_OPENSSL_MODULES)),
        }
    }
}
