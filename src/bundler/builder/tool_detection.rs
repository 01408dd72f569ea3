//! External tool detection.
//!
//! Resolves where 7-Zip and the signing tools live on the host. Windows
//! installs usually sit outside `PATH`, so the well-known install
//! directories are checked before falling back to a `PATH` lookup.

use crate::bundler::settings::HostOs;
use std::path::{Path, PathBuf};

/// Locates the 7-Zip command line tool.
///
/// - Windows: `%ProgramFiles%\7-Zip\7z.exe`, then the x86 Program Files,
///   then `7z` from `PATH`.
/// - Elsewhere: `7za` (p7zip standalone), then `7z`.
///
/// Falls back to the bare name so a missing tool surfaces as a spawn error
/// naming the program.
pub fn find_seven_zip(host: HostOs) -> PathBuf {
    if host.is_windows() {
        let candidates = [
            program_files("ProgramFiles", r"C:\Program Files"),
            program_files("ProgramFiles(x86)", r"C:\Program Files (x86)"),
        ];
        for root in candidates {
            let path = root.join("7-Zip").join("7z.exe");
            if path.exists() {
                log::debug!("Found 7-Zip at: {}", path.display());
                return path;
            }
        }
        return lookup("7z").unwrap_or_else(|| PathBuf::from("7z"));
    }

    lookup("7za")
        .or_else(|| lookup("7z"))
        .unwrap_or_else(|| PathBuf::from("7za"))
}

/// Locates signtool.
///
/// The ClickOnce SDK copy is preferred because it does not depend on a
/// particular Windows SDK version being installed.
pub fn find_signtool(host: HostOs) -> PathBuf {
    if host.is_windows() {
        let path = program_files("ProgramFiles(x86)", r"C:\Program Files (x86)")
            .join("Microsoft SDKs")
            .join("ClickOnce")
            .join("SignTool")
            .join("signtool.exe");
        if path.exists() {
            log::debug!("Found signtool at: {}", path.display());
            return path;
        }
    }
    lookup("signtool").unwrap_or_else(|| PathBuf::from("signtool"))
}

/// Locates osslsigncode on `PATH`.
pub fn find_osslsigncode() -> PathBuf {
    lookup("osslsigncode").unwrap_or_else(|| PathBuf::from("osslsigncode"))
}

/// Returns true if `program` resolves to an existing executable.
///
/// Accepts both bare names and paths.
pub fn is_available(program: &Path) -> bool {
    if program.components().count() > 1 {
        program.is_file()
    } else {
        which::which(program).is_ok()
    }
}

fn program_files(var: &str, fallback: &str) -> PathBuf {
    std::env::var_os(var)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(fallback))
}

fn lookup(name: &str) -> Option<PathBuf> {
    match which::which(name) {
        Ok(path) => {
            log::debug!("Found {} at: {}", name, path.display());
            Some(path)
        }
        Err(e) => {
            log::debug!("{} not found in PATH: {}", name, e);
            None
        }
    }
}
