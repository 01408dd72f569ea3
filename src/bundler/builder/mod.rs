//! Job orchestration.
//!
//! - [`orchestrator`] - [`Pipeline`] and its stages
//! - [`workdir`] - per-job scratch directory
//! - [`checksum`] - SHA-256 of the delivered installer
//! - [`tool_detection`] - locating 7-Zip and the signing tools

pub mod checksum;
pub mod orchestrator;
pub mod tool_detection;
pub mod workdir;

pub use orchestrator::{JobReport, JobStage, Pipeline};
pub use workdir::{WORK_DIR_PREFIX, WorkDir};
