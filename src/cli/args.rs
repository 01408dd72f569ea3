//! Command line argument parsing and validation.
//!
//! The camelCase long flags are kept for existing build scripts; each one
//! also accepts a kebab-case alias.

use crate::{
    bundler::{
        HostOs, PasswordTransport, Settings, SettingsBuilder, SettingsFile, SfxSection,
        SigningSection, SigningTool, ToolPaths, ToolsSection,
    },
    error::{CliError, Result},
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Signed SFX installer bundler
#[derive(Parser, Debug)]
#[command(
    name = "sfx_bundler",
    version,
    about = "Packages an extension build and its MSI into a signed self-extracting installer",
    long_about = "Packages a zipped browser-extension build and an MSI into a 7-Zip \
self-extracting Windows installer and signs it.

The extension files end up in build/ next to the MSI; running the installer \
launches msiexec on the MSI.

Usage:
  sfx_bundler -i theme.zip -m NewTabSetup.msi -c Certificate.pfx -o NewTabSetup.exe
  sfx_bundler --event event.json --storage-endpoint https://storage.example.com

Exit code 0 = signed installer delivered."
)]
pub struct Args {
    /// Zipped extension build
    #[arg(
        short = 'i',
        long = "inputFile",
        visible_alias = "input-file",
        value_name = "ZIP",
        default_value = "input.zip"
    )]
    pub input_file: PathBuf,

    /// MSI to embed
    #[arg(
        short = 'm',
        long = "msiFile",
        visible_alias = "msi-file",
        value_name = "MSI",
        default_value = "NewTabSetup.msi"
    )]
    pub msi_file: PathBuf,

    /// PKCS#12 signing certificate
    #[arg(
        short = 'c',
        long = "certFile",
        visible_alias = "cert-file",
        value_name = "PFX",
        default_value = "Certificate.pfx"
    )]
    pub cert_file: PathBuf,

    /// Certificate password
    #[arg(
        short = 'p',
        long = "certPassword",
        visible_alias = "cert-password",
        value_name = "PASSWORD",
        env = "SFX_CERT_PASSWORD",
        hide_env_values = true,
        default_value = "password"
    )]
    pub cert_password: String,

    /// Where the signed installer is written
    #[arg(
        short = 'o',
        long = "outputFile",
        visible_alias = "output-file",
        value_name = "EXE",
        default_value = "NewTabSetup.exe"
    )]
    pub output_file: PathBuf,

    /// 7-Zip SFX stub [default: 7zSD.sfx]
    #[arg(
        short = 's',
        long = "sfxModulePath",
        visible_alias = "sfx-module-path",
        value_name = "SFX"
    )]
    pub sfx_module_path: Option<PathBuf>,

    /// Install title shown by the stub and used as signature name
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Publisher URL embedded in the signature
    #[arg(long, value_name = "URL")]
    pub install_url: Option<String>,

    /// Program the stub launches after extraction
    #[arg(long, value_name = "EXE")]
    pub execute_file: Option<String>,

    /// Signing tool
    #[arg(long, value_enum, default_value_t = SignerChoice::Auto)]
    pub signer: SignerChoice,

    /// Timestamp authority for signtool
    #[arg(long, value_name = "URL")]
    pub timestamp_url: Option<String>,

    /// Pass the password to osslsigncode on the command line instead of a private file
    #[arg(long)]
    pub password_as_argument: bool,

    /// 7-Zip executable
    #[arg(long, value_name = "PATH")]
    pub seven_zip: Option<PathBuf>,

    /// osslsigncode executable
    #[arg(long, value_name = "PATH")]
    pub osslsigncode: Option<PathBuf>,

    /// signtool executable
    #[arg(long, value_name = "PATH")]
    pub signtool: Option<PathBuf>,

    /// OpenSSL provider directory exported to osslsigncode only
    #[arg(long, value_name = "DIR")]
    pub openssl_modules: Option<PathBuf>,

    /// Kill any external tool running longer than this
    #[arg(long, value_name = "SECS")]
    pub tool_timeout: Option<u64>,

    /// TOML settings file
    #[arg(long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Handle one cloud event (JSON file) instead of local paths
    #[arg(long, value_name = "JSON")]
    pub event: Option<PathBuf>,

    /// S3-compatible storage endpoint for --event
    #[arg(long, value_name = "URL", env = "SFX_STORAGE_ENDPOINT")]
    pub storage_endpoint: Option<String>,

    /// Bearer token for --storage-endpoint
    #[arg(
        long,
        value_name = "TOKEN",
        env = "SFX_STORAGE_TOKEN",
        hide_env_values = true
    )]
    pub storage_token: Option<String>,

    /// Directory-backed storage for --event, one sub-directory per bucket
    #[arg(long, value_name = "DIR", conflicts_with = "storage_endpoint")]
    pub storage_dir: Option<PathBuf>,

    /// Show tool invocations and other details
    #[arg(short, long)]
    pub verbose: bool,

    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// `--signer` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SignerChoice {
    /// signtool on Windows, osslsigncode elsewhere
    Auto,
    Osslsigncode,
    Signtool,
}

impl SignerChoice {
    fn tool(self) -> Option<SigningTool> {
        match self {
            SignerChoice::Auto => None,
            SignerChoice::Osslsigncode => Some(SigningTool::Osslsigncode),
            SignerChoice::Signtool => Some(SigningTool::Signtool),
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if self.tool_timeout == Some(0) {
            return Err(CliError::InvalidArguments {
                reason: "--tool-timeout must be at least 1 second".to_string(),
            }
            .into());
        }

        if self.event.is_some() {
            if self.storage_endpoint.is_none() && self.storage_dir.is_none() {
                return Err(CliError::MissingArgument {
                    argument: "--storage-endpoint or --storage-dir".to_string(),
                }
                .into());
            }
        } else if self.storage_endpoint.is_some() || self.storage_dir.is_some() {
            return Err(CliError::InvalidArguments {
                reason: "storage options only apply together with --event".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Values given on the command line, shaped like a settings file so they
    /// can be layered over one.
    pub fn overrides(&self) -> SettingsFile {
        SettingsFile {
            sfx: Some(SfxSection {
                title: self.title.clone(),
                install_url: self.install_url.clone(),
                execute_file: self.execute_file.clone(),
                ..Default::default()
            }),
            signing: Some(SigningSection {
                tool: self.signer.tool(),
                timestamp_url: self.timestamp_url.clone(),
                password_transport: self
                    .password_as_argument
                    .then_some(PasswordTransport::Argument),
            }),
            tools: Some(ToolsSection {
                seven_zip: self.seven_zip.clone(),
                osslsigncode: self.osslsigncode.clone(),
                signtool: self.signtool.clone(),
                sfx_module: self.sfx_module_path.clone(),
                openssl_modules: self.openssl_modules.clone(),
                timeout_secs: self.tool_timeout,
            }),
        }
    }

    /// Builds pipeline settings: defaults, then `--config`, then flags.
    ///
    /// Event mode starts from the fixed cloud runtime tool layout instead of
    /// host discovery.
    pub fn settings(&self) -> Result<Settings> {
        let host = HostOs::current();
        let tools = if self.event.is_some() {
            ToolPaths::function_layer()
        } else {
            ToolPaths::detect(host)
        };

        let mut builder = SettingsBuilder::new().host(host).tools(tools);
        if let Some(path) = &self.config {
            builder = builder.merge_file(&SettingsFile::load(path)?);
        }
        Ok(builder.merge_file(&self.overrides()).build()?)
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(args.verbose, args.quiet),
        }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) -> std::io::Result<()> {
        self.output.verbose(message)
    }

    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.output.success(message)
    }

    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.output.warn(message)
    }

    pub fn progress(&self, message: &str) -> std::io::Result<()> {
        self.output.progress(message)
    }

    pub fn section(&self, title: &str) -> std::io::Result<()> {
        self.output.section(title)
    }

    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.output.indent(message)
    }

    pub fn error(&self, message: &str) -> std::io::Result<()> {
        self.output.error(message)
    }
}
