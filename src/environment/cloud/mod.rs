//! Event-driven cloud deployment.
//!
//! A function runtime hands over a JSON event naming the input, installer
//! and certificate objects plus the output location. [`handle_event`] runs
//! the pipeline for it and answers with a status code and JSON body.

pub mod storage;

pub use storage::{DirectoryObjectStore, HttpObjectStore, ObjectStore, download_to};

use super::{Delivery, Environment, JobInputs};
use crate::bundler::{CertificatePassword, Context, Pipeline, Result, Settings, ToolRunner};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File names inside the work directory.
const INPUT_ARCHIVE_NAME: &str = "input.zip";
const CERTIFICATE_NAME: &str = "certificate.pfx";

/// Message returned on success.
pub const SUCCESS_MESSAGE: &str = "SFX archive created, signed, and uploaded successfully!";

/// One packaging request.
///
/// ```json
/// {
///   "inputBucket": "uploads", "inputKey": "ocean/build.zip",
///   "msiBucket": "installers", "msiKey": "NewTabSetup.msi",
///   "certBucket": "secrets", "certKey": "codesign.pfx",
///   "certPassword": "…",
///   "outputBucket": "releases", "outputKey": "ocean/NewTabSetup.exe",
///   "title": "Ocean Waves New Tab"
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudEvent {
    pub input_bucket: String,
    pub input_key: String,
    pub msi_bucket: String,
    pub msi_key: String,
    pub cert_bucket: String,
    pub cert_key: String,
    pub cert_password: CertificatePassword,
    pub output_bucket: String,
    pub output_key: String,

    /// Per-job install title
    #[serde(default)]
    pub title: Option<String>,
    /// Per-job publisher URL embedded in the signature
    #[serde(default)]
    pub install_url: Option<String>,
    /// Per-job program the stub launches
    #[serde(default)]
    pub execute_file: Option<String>,
}

impl CloudEvent {
    /// Parses an event from JSON text.
    pub fn from_json(text: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Function response: HTTP-style status plus a JSON string body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl CloudResponse {
    pub fn success() -> Self {
        Self {
            status_code: 200,
            body: serde_json::json!({ "message": SUCCESS_MESSAGE }).to_string(),
        }
    }

    pub fn failure(error: &crate::bundler::Error) -> Self {
        Self {
            status_code: 500,
            body: serde_json::json!({ "error": error.to_string() }).to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Inputs from and output to an [`ObjectStore`].
#[derive(Debug)]
pub struct CloudEnvironment<S> {
    store: S,
    event: CloudEvent,
    installer_name: String,
}

impl<S: ObjectStore> CloudEnvironment<S> {
    /// `installer_name` is the file name the MSI is downloaded as.
    pub fn new(store: S, event: CloudEvent, installer_name: impl Into<String>) -> Self {
        Self {
            store,
            event,
            installer_name: installer_name.into(),
        }
    }
}

impl<S: ObjectStore> Environment for CloudEnvironment<S> {
    async fn fetch_inputs(&self, work_dir: &Path) -> Result<JobInputs> {
        let (store, event) = (&self.store, &self.event);
        let input_archive = work_dir.join(INPUT_ARCHIVE_NAME);
        let installer = work_dir.join(&self.installer_name);
        let certificate = work_dir.join(CERTIFICATE_NAME);

        download_to(store, &event.input_bucket, &event.input_key, &input_archive).await?;
        download_to(store, &event.msi_bucket, &event.msi_key, &installer).await?;
        download_to(store, &event.cert_bucket, &event.cert_key, &certificate).await?;

        Ok(JobInputs {
            input_archive,
            installer,
            certificate,
            password: event.cert_password.clone(),
        })
    }

    async fn deliver(&self, signed: &Path) -> Result<Delivery> {
        let event = &self.event;
        log::info!("Uploading to {}/{}", event.output_bucket, event.output_key);
        self.store
            .put_object(&event.output_bucket, &event.output_key, signed)
            .await
            .with_context(|| format!("uploading {}", signed.display()))?;
        log::info!("✓ Uploaded {}/{}", event.output_bucket, event.output_key);
        Ok(Delivery::Object {
            bucket: event.output_bucket.clone(),
            key: event.output_key.clone(),
        })
    }

    fn describe(&self) -> String {
        format!(
            "{}/{} -> {}/{}",
            self.event.input_bucket,
            self.event.input_key,
            self.event.output_bucket,
            self.event.output_key
        )
    }
}

/// Runs one job for `event` and reports the outcome.
///
/// Never fails: every error becomes a 500 response with the message in the
/// body.
pub async fn handle_event<S, R>(
    event: CloudEvent,
    store: S,
    settings: &Settings,
    runner: R,
) -> CloudResponse
where
    S: ObjectStore,
    R: ToolRunner,
{
    let settings = settings.with_overrides(
        event.title.as_deref(),
        event.install_url.as_deref(),
        event.execute_file.as_deref(),
    );
    let env = CloudEnvironment::new(store, event, settings.installer_name());
    let pipeline = Pipeline::new(settings, runner);

    match pipeline.run(&env).await {
        Ok(report) => {
            log::info!(
                "✓ Delivered {} (sha256 {})",
                report.delivery,
                report.checksum
            );
            CloudResponse::success()
        }
        Err(e) => {
            log::error!("Error processing the request: {}", e);
            CloudResponse::failure(&e)
        }
    }
}
