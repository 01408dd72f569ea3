//! Authenticode signing of the assembled executable.
//!
//! Two external tools are supported:
//! - `osslsigncode` with a PKCS#12 bundle, on any host
//! - `signtool`, Windows only
//!
//! Neither result is verified beyond the tool's exit status and the presence
//! of the signed file.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    settings::{HostOs, PasswordTransport, Settings, SigningTool},
    utils::{
        fs,
        process::{Invocation, ToolRunner},
    },
};
use std::{
    fmt,
    path::{Path, PathBuf},
};

/// Certificate password. Never printed.
#[derive(Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(transparent)]
pub struct CertificatePassword(String);

impl CertificatePassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Returns the plain password.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CertificatePassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CertificatePassword(****)")
    }
}

/// One signing job.
#[derive(Debug, Clone, Copy)]
pub struct SignRequest<'a> {
    /// Unsigned executable
    pub input: &'a Path,
    /// Where the signed executable goes
    pub output: &'a Path,
    /// PKCS#12 (.pfx) bundle
    pub certificate: &'a Path,
    pub password: &'a CertificatePassword,
    /// Scratch directory for the transient password file
    pub work_dir: &'a Path,
}

/// Picks the signing tool for `host`.
///
/// `None` selects signtool on Windows and osslsigncode elsewhere. Asking for
/// signtool on a non-Windows host fails without spawning anything.
pub fn select_tool(host: HostOs, requested: Option<SigningTool>) -> Result<SigningTool> {
    match (requested, host) {
        (Some(SigningTool::Signtool), HostOs::Other) => Err(Error::Unsupported {
            what: "signtool".to_string(),
            host: host.to_string(),
        }),
        (Some(tool), _) => Ok(tool),
        (None, HostOs::Windows) => Ok(SigningTool::Signtool),
        (None, HostOs::Other) => Ok(SigningTool::Osslsigncode),
    }
}

/// Signs `request.input` into `request.output`.
///
/// # Returns
///
/// Path of the signed executable.
pub async fn sign_file<R: ToolRunner>(
    runner: &R,
    settings: &Settings,
    request: &SignRequest<'_>,
) -> Result<PathBuf> {
    let tool = select_tool(settings.host(), settings.signing().tool)?;
    log::info!("Signing {} with {}", request.input.display(), tool);

    if !fs::is_file(request.certificate).await {
        return Err(Error::InputNotFound {
            what: "certificate file",
            path: request.certificate.to_path_buf(),
        });
    }

    match tool {
        SigningTool::Osslsigncode => sign_with_osslsigncode(runner, settings, request).await?,
        SigningTool::Signtool => sign_with_signtool(runner, settings, request).await?,
    }

    if !fs::is_file(request.output).await {
        return Err(Error::MissingOutput {
            command: tool.name().to_string(),
            path: request.output.to_path_buf(),
        });
    }

    log::info!("✓ Signed {}", request.output.display());
    Ok(request.output.to_path_buf())
}

async fn sign_with_osslsigncode<R: ToolRunner>(
    runner: &R,
    settings: &Settings,
    request: &SignRequest<'_>,
) -> Result<()> {
    // osslsigncode refuses to overwrite in some versions
    if request.output != request.input {
        match tokio::fs::remove_file(request.output).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).fs_context("removing stale signed output", request.output),
        }
    }

    match settings.signing().password_transport {
        PasswordTransport::TransientFile => {
            let password_file = PasswordFile::create(request.work_dir, request.password).await?;
            let invocation = osslsigncode_invocation(settings, request, Some(password_file.path()));
            let result = runner.run(&invocation).await;
            password_file.remove().await;
            result
        }
        PasswordTransport::Argument => {
            log::warn!("Passing the certificate password on the osslsigncode command line");
            runner
                .run(&osslsigncode_invocation(settings, request, None))
                .await
        }
    }
}

async fn sign_with_signtool<R: ToolRunner>(
    runner: &R,
    settings: &Settings,
    request: &SignRequest<'_>,
) -> Result<()> {
    if settings.signing().password_transport == PasswordTransport::TransientFile {
        log::warn!("signtool only accepts the certificate password as an argument");
    }

    // signtool signs in place
    if request.output != request.input {
        fs::copy_file(request.input, request.output).await?;
    }
    runner.run(&signtool_invocation(settings, request)).await
}

/// `osslsigncode sign -pkcs12 <cert> (-readpass <file> | -pass <pwd>) -n <title> -i <url> -in <in> -out <out>`
pub fn osslsigncode_invocation(
    settings: &Settings,
    request: &SignRequest<'_>,
    password_file: Option<&Path>,
) -> Invocation {
    let tools = settings.tools();
    let mut invocation = Invocation::new("osslsigncode", &tools.osslsigncode)
        .arg("sign")
        .arg("-pkcs12")
        .arg(request.certificate);

    invocation = match password_file {
        Some(file) => invocation.arg("-readpass").arg(file),
        None => invocation
            .arg("-pass")
            .secret_arg(request.password.expose()),
    };

    invocation = invocation
        .arg("-n")
        .arg(&settings.sfx().title)
        .arg("-i")
        .arg(&settings.sfx().install_url)
        .arg("-in")
        .arg(request.input)
        .arg("-out")
        .arg(request.output);

    if let Some(modules) = &tools.openssl_modules {
        invocation = invocation.env("OPENSSL_MODULES", modules);
    }
    invocation
}

/// `signtool sign /f <cert> /p <pwd> /tr <tsa> /td sha256 /fd sha256 <file>`
pub fn signtool_invocation(settings: &Settings, request: &SignRequest<'_>) -> Invocation {
    Invocation::new("signtool", &settings.tools().signtool)
        .arg("sign")
        .arg("/f")
        .arg(request.certificate)
        .arg("/p")
        .secret_arg(request.password.expose())
        .arg("/tr")
        .arg(&settings.signing().timestamp_url)
        .args(["/td", "sha256", "/fd", "sha256"])
        .arg(request.output)
}

/// Owner-only file holding the password for the duration of one signing call.
struct PasswordFile {
    path: PathBuf,
}

impl PasswordFile {
    async fn create(dir: &Path, password: &CertificatePassword) -> Result<Self> {
        use tokio::io::AsyncWriteExt;

        let path = dir.join(format!(".certpass-{}", uuid::Uuid::new_v4()));
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&path)
            .await
            .fs_context("creating password file", &path)?;
        // Guard exists from here on so a failed write still removes the file.
        let guard = Self { path };
        file.write_all(password.expose().as_bytes())
            .await
            .fs_context("writing password file", &guard.path)?;
        file.flush()
            .await
            .fs_context("writing password file", &guard.path)?;
        Ok(guard)
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn remove(self) {
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            log::warn!(
                "Failed to remove password file {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

impl Drop for PasswordFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
