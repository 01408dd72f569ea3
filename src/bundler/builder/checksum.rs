//! Artifact checksum calculation.
//!
//! SHA-256 of the signed installer, reported alongside its size so the
//! delivered file can be checked after transfer.

use crate::{
    bail,
    bundler::{Result, error::ErrorExt},
};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Calculates the SHA-256 checksum of a regular file.
///
/// Reads the file in 8KB chunks.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash (64 characters)
/// * `Err` - If the path cannot be read or is not a file
pub async fn calculate_sha256(path: &Path) -> Result<String> {
    let metadata = tokio::fs::metadata(path)
        .await
        .fs_context("reading file metadata", path)?;
    if !metadata.is_file() {
        bail!("cannot checksum {}: not a file", path.display());
    }

    let mut file = tokio::fs::File::open(path)
        .await
        .fs_context("opening file for hashing", path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for hash calculation", path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn known_digest() {
        let dir = tempfile::tempdir().expect("temp dir");
        let file = dir.path().join("abc.bin");
        std::fs::write(&file, b"abc").expect("write");

        let sum = calculate_sha256(&file).await.expect("hashes");

        assert_eq!(
            sum,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn directories_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");

        assert!(calculate_sha256(dir.path()).await.is_err());
    }
}
