//! Signed SFX installer bundling.
//!
//! Turns a zipped browser-extension build and an MSI into a single
//! self-extracting Windows executable and signs it.
//!
//! # Example
//!
//! ```no_run
//! use sfx_bundler::bundler::{Pipeline, SettingsBuilder, SystemRunner};
//! use sfx_bundler::environment::LocalEnvironment;
//!
//! # async fn example() -> sfx_bundler::bundler::Result<()> {
//! let settings = SettingsBuilder::new().build()?;
//! let env = LocalEnvironment::new(
//!     "input.zip",
//!     "NewTabSetup.msi",
//!     "Certificate.pfx",
//!     "password",
//!     "NewTabSetup.exe",
//! );
//!
//! let pipeline = Pipeline::new(settings, SystemRunner::new());
//! let report = pipeline.run(&env).await?;
//! println!("{} ({} bytes)", report.delivery, report.signed_size);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod error;
pub mod platform;
pub mod settings;
pub mod utils;

pub use builder::{JobReport, JobStage, Pipeline, WorkDir};
pub use error::{Context, Error, ErrorExt, Result};
pub use platform::windows::{
    sfx::AssemblyReport,
    sign::{CertificatePassword, select_tool},
};
pub use settings::*;
pub use utils::process::{Invocation, SystemRunner, ToolRunner};
