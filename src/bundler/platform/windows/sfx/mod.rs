//! 7-Zip SFX installer construction.
//!
//! - [`stage`] - rearranges the extracted tree into `build/` + installer
//! - [`archive`] - 7-Zip extract and create invocations
//! - [`config`] - the install block read by the stub
//! - [`assemble`] - stub + config + archive concatenation

pub mod archive;
pub mod assemble;
pub mod config;
pub mod stage;

pub use assemble::{AssemblyReport, CONFIG_FILE_NAME, assemble};
pub use config::{BEGIN_MARKER, ConfigBlock, END_MARKER};
pub use stage::{BUILD_DIR, STAGING_DIR, stage, verify_layout};
