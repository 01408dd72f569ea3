//! SFX executable assembly.
//!
//! The output is the byte-for-byte concatenation `stub ++ config ++ archive`.
//! The stub finds its config and payload by scanning past its own image, so
//! order matters and nothing may be inserted between the parts.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    utils::fs,
};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};

/// File name the config text is written to, next to the output.
pub const CONFIG_FILE_NAME: &str = "config.txt";

/// Sizes of the assembled parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Assembled executable
    pub output: PathBuf,
    /// Config text as written to disk
    pub config_path: PathBuf,
    pub stub_len: u64,
    pub config_len: u64,
    pub archive_len: u64,
    /// Always `stub_len + config_len + archive_len`
    pub total_len: u64,
}

/// Writes `config_text` to disk and concatenates stub, config and archive
/// into `output`.
pub async fn assemble(
    stub: &Path,
    config_text: &str,
    archive: &Path,
    output: &Path,
) -> Result<AssemblyReport> {
    log::info!("Assembling {}", output.display());

    let out_dir = output.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(out_dir).await?;
    let config_path = out_dir.join(CONFIG_FILE_NAME);
    tokio::fs::write(&config_path, config_text.as_bytes())
        .await
        .fs_context("writing SFX config", &config_path)?;

    let file = tokio::fs::File::create(output)
        .await
        .fs_context("creating SFX executable", output)?;
    let mut writer = BufWriter::new(file);

    let stub_len = append(&mut writer, stub, "SFX module", output).await?;
    let config_len = append(&mut writer, &config_path, "SFX config", output).await?;
    let archive_len = append(&mut writer, archive, "archive", output).await?;

    writer
        .flush()
        .await
        .fs_context("flushing SFX executable", output)?;
    writer
        .into_inner()
        .sync_all()
        .await
        .fs_context("syncing SFX executable", output)?;

    let total_len = stub_len + config_len + archive_len;
    let written = tokio::fs::metadata(output)
        .await
        .fs_context("reading SFX executable metadata", output)?
        .len();
    if written != total_len {
        return Err(Error::GenericError(format!(
            "assembled {} has {} bytes, expected {}",
            output.display(),
            written,
            total_len
        )));
    }

    log::debug!(
        "SFX parts: stub {} + config {} + archive {} = {} bytes",
        stub_len,
        config_len,
        archive_len,
        total_len
    );

    Ok(AssemblyReport {
        output: output.to_path_buf(),
        config_path,
        stub_len,
        config_len,
        archive_len,
        total_len,
    })
}

async fn append(
    writer: &mut BufWriter<tokio::fs::File>,
    part: &Path,
    what: &'static str,
    output: &Path,
) -> Result<u64> {
    let mut reader = match tokio::fs::File::open(part).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::InputNotFound {
                what,
                path: part.to_path_buf(),
            });
        }
        Err(e) => return Err(e).fs_context("opening SFX part", part),
    };
    tokio::io::copy(&mut reader, writer)
        .await
        .fs_context("writing SFX executable", output)
}
