//! 7-Zip invocations.
//!
//! The argument shapes match what the SFX stub and existing build scripts
//! expect; change them only together with the stub configuration.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    utils::{
        fs,
        process::{Invocation, ToolRunner},
    },
};
use std::{ffi::OsString, path::Path};

/// Tool name used in logs and errors.
pub const SEVEN_ZIP: &str = "7z";

/// `7z x <archive> -o<dir> -y`
pub fn extract_invocation(seven_zip: &Path, archive: &Path, out_dir: &Path) -> Invocation {
    let mut out_flag = OsString::from("-o");
    out_flag.push(out_dir);

    Invocation::new(SEVEN_ZIP, seven_zip)
        .arg("x")
        .arg(archive)
        .arg(out_flag)
        .arg("-y")
}

/// `7z a <archive> <staged_root>/* -m0=lzma2 -mx=0 -r`
///
/// The wildcard is expanded by 7-Zip itself, so the staging root's name does
/// not appear inside the archive.
pub fn create_invocation(seven_zip: &Path, archive: &Path, staged_root: &Path) -> Invocation {
    Invocation::new(SEVEN_ZIP, seven_zip)
        .arg("a")
        .arg(archive)
        .arg(staged_root.join("*"))
        .args(["-m0=lzma2", "-mx=0", "-r"])
}

/// Extracts `archive` into `out_dir`, creating it first.
pub async fn extract<R: ToolRunner>(
    runner: &R,
    seven_zip: &Path,
    archive: &Path,
    out_dir: &Path,
) -> Result<()> {
    log::info!(
        "Extracting {} into {}",
        archive.display(),
        out_dir.display()
    );

    fs::create_dir_all(out_dir).await?;
    runner
        .run(&extract_invocation(seven_zip, archive, out_dir))
        .await
}

/// Packs the staged tree into `archive` and returns the archive size.
pub async fn create<R: ToolRunner>(
    runner: &R,
    seven_zip: &Path,
    staged_root: &Path,
    archive: &Path,
) -> Result<u64> {
    log::info!("Creating archive {}", archive.display());

    runner
        .run(&create_invocation(seven_zip, archive, staged_root))
        .await?;

    match tokio::fs::metadata(archive).await {
        Ok(metadata) if metadata.is_file() => Ok(metadata.len()),
        Ok(_) => Err(Error::GenericError(format!("{} is not a file", archive.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::MissingOutput {
            command: SEVEN_ZIP.to_string(),
            path: archive.to_path_buf(),
        }),
        Err(e) => Err(e).fs_context("reading archive metadata", archive),
    }
}
