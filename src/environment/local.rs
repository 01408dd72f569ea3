use super::{Delivery, Environment, JobInputs};
use crate::bundler::{CertificatePassword, Error, Result, utils::fs};
use std::path::{Path, PathBuf};

/// Inputs and output on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalEnvironment {
    input_archive: PathBuf,
    installer: PathBuf,
    certificate: PathBuf,
    password: CertificatePassword,
    output: PathBuf,
}

impl LocalEnvironment {
    /// # Arguments
    ///
    /// * `input_archive` - zipped extension build
    /// * `installer` - MSI to embed
    /// * `certificate` - PKCS#12 bundle
    /// * `password` - certificate password
    /// * `output` - destination of the signed installer
    pub fn new(
        input_archive: impl Into<PathBuf>,
        installer: impl Into<PathBuf>,
        certificate: impl Into<PathBuf>,
        password: impl Into<String>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input_archive: input_archive.into(),
            installer: installer.into(),
            certificate: certificate.into(),
            password: CertificatePassword::new(password),
            output: output.into(),
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

async fn require_file(what: &'static str, path: &Path) -> Result<PathBuf> {
    if fs::is_file(path).await {
        Ok(path.to_path_buf())
    } else {
        Err(Error::InputNotFound {
            what,
            path: path.to_path_buf(),
        })
    }
}

impl Environment for LocalEnvironment {
    async fn fetch_inputs(&self, _work_dir: &Path) -> Result<JobInputs> {
        Ok(JobInputs {
            input_archive: require_file("input archive", &self.input_archive).await?,
            installer: require_file("installer file", &self.installer).await?,
            certificate: require_file("certificate file", &self.certificate).await?,
            password: self.password.clone(),
        })
    }

    async fn deliver(&self, signed: &Path) -> Result<Delivery> {
        fs::copy_file(signed, &self.output).await?;
        log::info!("✓ Wrote {}", self.output.display());
        Ok(Delivery::File(self.output.clone()))
    }

    fn describe(&self) -> String {
        format!(
            "{} + {} -> {}",
            self.input_archive.display(),
            self.installer.display(),
            self.output.display()
        )
    }
}
