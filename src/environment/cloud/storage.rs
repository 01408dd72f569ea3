//! Object storage gateway.
//!
//! Objects are addressed by bucket and key. Two backends:
//!
//! - [`HttpObjectStore`] - S3-compatible endpoint, path-style URLs
//!   (`{endpoint}/{bucket}/{key}`), optional bearer token
//! - [`DirectoryObjectStore`] - one sub-directory per bucket under a root
//!
//! Every failure is reported as [`Error::Storage`].

use crate::bundler::{Error, ErrorExt, Result, utils::fs};
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Read and write access to bucket objects.
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    /// Fetches the whole object.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes>;

    /// Uploads the file at `path`, replacing any existing object.
    async fn put_object(&self, bucket: &str, key: &str, path: &Path) -> Result<()>;
}

/// Fetches `bucket/key` into the local file `dest`.
///
/// # Returns
///
/// Number of bytes written.
pub async fn download_to<S: ObjectStore>(
    store: &S,
    bucket: &str,
    key: &str,
    dest: &Path,
) -> Result<u64> {
    log::info!("Downloading {}/{} to {}", bucket, key, dest.display());

    let body = store.get_object(bucket, key).await?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(dest, &body)
        .await
        .fs_context("writing downloaded object", dest)?;
    Ok(body.len() as u64)
}

/// S3-compatible HTTP object store.
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
}

impl HttpObjectStore {
    /// Creates a store for `endpoint`, e.g. `https://storage.example.com/`.
    pub fn new(endpoint: &str, token: Option<String>) -> Result<Self> {
        let endpoint = match Url::parse(endpoint) {
            Ok(url) => url,
            Err(e) => {
                let message = format!("invalid storage endpoint {endpoint:?}: {e}");
                return Err(Error::Storage(message));
            }
        };
        if endpoint.cannot_be_a_base() {
            return Err(cannot_hold_paths(&endpoint));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            token,
        })
    }

    /// Path-style URL of an object.
    pub fn object_url(&self, bucket: &str, key: &str) -> Result<Url> {
        validate_name(bucket, key)?;
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| cannot_hold_paths(&self.endpoint))?
            .pop_if_empty()
            .push(bucket)
            .extend(key.split('/'));
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn cannot_hold_paths(endpoint: &Url) -> Error {
    let message = format!("storage endpoint {endpoint} cannot hold object paths");
    Error::Storage(message)
}

impl ObjectStore for HttpObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes> {
        let url = self.object_url(bucket, key)?;
        log::debug!("GET {}", url);

        let response = self.authorize(self.client.get(url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Storage(format!("GET {bucket}/{key} returned {status}")));
        }
        Ok(response.bytes().await?)
    }

    async fn put_object(&self, bucket: &str, key: &str, path: &Path) -> Result<()> {
        let url = self.object_url(bucket, key)?;
        let body = tokio::fs::read(path)
            .await
            .fs_context("reading upload", path)?;
        log::debug!("PUT {} ({} bytes)", url, body.len());

        let response = self
            .authorize(self.client.put(url))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Storage(format!("PUT {bucket}/{key} returned {status}")));
        }
        Ok(())
    }
}

/// Buckets as sub-directories of a local root.
#[derive(Debug, Clone)]
pub struct DirectoryObjectStore {
    root: PathBuf,
}

impl DirectoryObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File backing `bucket/key`.
    pub fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        validate_name(bucket, key)?;
        Ok(self.root.join(bucket).join(key))
    }
}

impl ObjectStore for DirectoryObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes> {
        let path = self.object_path(bucket, key)?;
        match tokio::fs::read(&path).await {
            Ok(body) => Ok(Bytes::from(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::Storage(format!("no such object {bucket}/{key}")))
            }
            Err(e) => Err(Error::Storage(format!(
                "reading {bucket}/{key} ({}): {e}",
                path.display()
            ))),
        }
    }

    async fn put_object(&self, bucket: &str, key: &str, path: &Path) -> Result<()> {
        let dest = self.object_path(bucket, key)?;
        fs::copy_file(path, &dest)
            .await
            .map_err(|e| Error::Storage(format!("writing {bucket}/{key}: {e}")))?;
        Ok(())
    }
}

/// Rejects names that would escape the bucket or address nothing.
fn validate_name(bucket: &str, key: &str) -> Result<()> {
    let escapes = Path::new(key)
        .components()
        .chain(Path::new(bucket).components())
        .any(|c| !matches!(c, Component::Normal(_)));

    let reason = if bucket.is_empty() || key.is_empty() {
        "empty bucket or key"
    } else if bucket.contains(['/', '\\']) {
        "bucket contains a path separator"
    } else if escapes {
        "relative or absolute path components"
    } else {
        return Ok(());
    };
    let message = format!("invalid object {bucket}/{key}: {reason}");
    Err(Error::Storage(message))
}
