//! Deployment environments.
//!
//! The pipeline is the same everywhere; only where inputs come from and where
//! the signed installer goes differ. An [`Environment`] supplies both ends:
//!
//! - [`LocalEnvironment`] - paths on disk, output copied to a local file
//! - [`CloudEnvironment`] - objects in a bucket store, output uploaded

pub mod cloud;
mod local;

pub use cloud::{CloudEnvironment, CloudEvent, CloudResponse, handle_event};
pub use local::LocalEnvironment;

use crate::bundler::{CertificatePassword, Result};
use std::{
    fmt,
    path::{Path, PathBuf},
};

/// Local copies of everything one job consumes.
#[derive(Debug, Clone)]
pub struct JobInputs {
    /// Zipped extension build
    pub input_archive: PathBuf,
    /// MSI placed at the archive root
    pub installer: PathBuf,
    /// PKCS#12 signing certificate
    pub certificate: PathBuf,
    pub password: CertificatePassword,
}

/// Where the signed installer ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Copied to a local file
    File(PathBuf),
    /// Uploaded to object storage
    Object { bucket: String, key: String },
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delivery::File(path) => write!(f, "{}", path.display()),
            Delivery::Object { bucket, key } => write!(f, "{}/{}", bucket, key),
        }
    }
}

/// Source of job inputs and sink of the signed installer.
#[allow(async_fn_in_trait)]
pub trait Environment {
    /// Makes the inputs available as local files.
    ///
    /// `work_dir` is the job's scratch directory and may be used to hold
    /// downloads. Missing inputs fail here, before anything is staged.
    async fn fetch_inputs(&self, work_dir: &Path) -> Result<JobInputs>;

    /// Hands off the signed installer.
    async fn deliver(&self, signed: &Path) -> Result<Delivery>;

    /// Short description for logs.
    fn describe(&self) -> String;
}
