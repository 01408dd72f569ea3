//! Signed self-extracting installer bundler.
//!
//! Packages a zipped browser-extension build and an MSI into a 7-Zip SFX
//! Windows executable and signs it with osslsigncode or signtool.
//!
//! It can be used both as a CLI tool and as a library dependency, locally or
//! as a cloud function handler.

pub mod bundler;
pub mod cli;
pub mod environment;
pub mod error;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
