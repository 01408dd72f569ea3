//! Job pipeline.
//!
//! One job turns a zipped extension build and an MSI into a signed SFX
//! installer:
//!
//! ```text
//! Init → Extract → Stage → Assemble → Sign → Upload → Done
//! ```
//!
//! Any failure ends the job in the single failed state,
//! [`Error::Stage`](crate::bundler::Error::Stage), tagged with the stage that
//! was running. The work directory is removed in every case.

use super::{checksum::calculate_sha256, workdir::WorkDir};
use crate::{
    bundler::{
        Error, Result, Settings,
        error::ErrorExt,
        platform::windows::{
            sfx::{self, AssemblyReport, ConfigBlock, archive},
            sign::{SignRequest, sign_file},
        },
        utils::{fs, process::ToolRunner},
    },
    environment::{Delivery, Environment, JobInputs},
};
use std::{
    fmt,
    future::Future,
    path::{Path, PathBuf},
};

/// Work directory layout.
const EXTRACT_DIR: &str = "build";
const ARCHIVE_NAME: &str = "archive.7z";
const UNSIGNED_NAME: &str = "output.exe";
const SIGNED_NAME: &str = "signed-output.exe";

/// Pipeline stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobStage {
    /// Work directory creation and input retrieval
    Init,
    /// Unpacking the input archive
    Extract,
    /// Rearranging the tree and adding the installer
    Stage,
    /// Re-archiving and SFX concatenation
    Assemble,
    Sign,
    /// Delivery of the signed installer
    Upload,
    Done,
}

impl JobStage {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStage::Init => "init",
            JobStage::Extract => "extract",
            JobStage::Stage => "stage",
            JobStage::Assemble => "assemble",
            JobStage::Sign => "sign",
            JobStage::Upload => "upload",
            JobStage::Done => "done",
        }
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful job.
#[derive(Clone, Debug)]
pub struct JobReport {
    /// Final location of the signed installer
    pub delivery: Delivery,
    /// Unsigned SFX part sizes
    pub assembly: AssemblyReport,
    /// Size of the signed installer
    pub signed_size: u64,
    /// Hex SHA-256 of the signed installer
    pub checksum: String,
}

/// Runs packaging jobs.
///
/// Holds the settings and the [`ToolRunner`] used for every external tool.
/// The same pipeline serves local and cloud runs; the [`Environment`]
/// passed to [`Pipeline::run`] decides where inputs come from and where the
/// result goes.
///
/// # Examples
///
/// ```no_run
/// use sfx_bundler::bundler::{Pipeline, Settings, SystemRunner};
/// use sfx_bundler::environment::LocalEnvironment;
///
/// # async fn example(settings: Settings) -> sfx_bundler::bundler::Result<()> {
/// let env = LocalEnvironment::new("input.zip", "NewTabSetup.msi", "Certificate.pfx", "pw", "out.exe");
/// let report = Pipeline::new(settings, SystemRunner::new()).run(&env).await?;
/// println!("sha256 {}", report.checksum);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Pipeline<R> {
    settings: Settings,
    runner: R,
    work_root: Option<PathBuf>,
}

impl<R: ToolRunner> Pipeline<R> {
    pub fn new(settings: Settings, runner: R) -> Self {
        Self {
            settings,
            runner,
            work_root: None,
        }
    }

    /// Creates work directories under `root` instead of the system temp dir.
    pub fn with_work_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.work_root = Some(root.into());
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs one job to completion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stage`] naming the stage that failed. Nothing is
    /// retried and the work directory is gone when this returns.
    pub async fn run<E: Environment>(&self, env: &E) -> Result<JobReport> {
        log::info!("Starting job: {}", env.describe());

        let work = match &self.work_root {
            Some(root) => WorkDir::create_in(root).await,
            None => WorkDir::create().await,
        }
        .map_err(|e| failed(JobStage::Init, e))?;

        let result = self.run_in(env, &work).await;

        if let Err(e) = work.close().await {
            log::warn!("Work directory cleanup failed: {}", e);
        }

        match &result {
            Ok(report) => log::info!("✓ Job {} ({})", JobStage::Done, report.delivery),
            Err(e) => log::error!("Job failed: {}", e),
        }
        result
    }

    async fn run_in<E: Environment>(&self, env: &E, work: &WorkDir) -> Result<JobReport> {
        let inputs = in_stage(JobStage::Init, self.init(env, work.path())).await?;

        let tree = work.join(EXTRACT_DIR);
        in_stage(
            JobStage::Extract,
            archive::extract(
                &self.runner,
                &self.settings.tools().seven_zip,
                &inputs.input_archive,
                &tree,
            ),
        )
        .await?;

        let staged = in_stage(JobStage::Stage, self.stage_tree(&tree, &inputs.installer)).await?;

        let assembly = in_stage(JobStage::Assemble, self.assemble(work, &staged)).await?;

        let (signed, signed_size, checksum) =
            in_stage(JobStage::Sign, self.sign(work, &assembly.output, &inputs)).await?;

        let delivery = in_stage(JobStage::Upload, env.deliver(&signed)).await?;

        Ok(JobReport {
            delivery,
            assembly,
            signed_size,
            checksum,
        })
    }

    async fn init<E: Environment>(&self, env: &E, work_dir: &Path) -> Result<JobInputs> {
        let inputs = env.fetch_inputs(work_dir).await?;

        let stub = &self.settings.tools().sfx_module;
        if !fs::is_file(stub).await {
            return Err(Error::InputNotFound {
                what: "SFX module",
                path: stub.clone(),
            });
        }
        Ok(inputs)
    }

    async fn stage_tree(&self, tree: &Path, installer: &Path) -> Result<PathBuf> {
        let installer_name = self.settings.installer_name();
        let staged = sfx::stage(tree, installer, installer_name).await?;
        sfx::verify_layout(&staged, installer_name).await?;
        Ok(staged)
    }

    async fn assemble(&self, work: &WorkDir, staged: &Path) -> Result<AssemblyReport> {
        let tools = self.settings.tools();
        let archive_path = work.join(ARCHIVE_NAME);
        archive::create(&self.runner, &tools.seven_zip, staged, &archive_path).await?;

        let config = ConfigBlock::from_settings(self.settings.sfx()).render()?;
        let report = sfx::assemble(
            &tools.sfx_module,
            &config,
            &archive_path,
            &work.join(UNSIGNED_NAME),
        )
        .await?;

        log::info!(
            "✓ Assembled {} ({} bytes)",
            report.output.display(),
            report.total_len
        );
        Ok(report)
    }

    async fn sign(
        &self,
        work: &WorkDir,
        unsigned: &Path,
        inputs: &JobInputs,
    ) -> Result<(PathBuf, u64, String)> {
        let output = work.join(SIGNED_NAME);
        let request = SignRequest {
            input: unsigned,
            output: &output,
            certificate: &inputs.certificate,
            password: &inputs.password,
            work_dir: work.path(),
        };
        let signed = sign_file(&self.runner, &self.settings, &request).await?;

        let size = tokio::fs::metadata(&signed)
            .await
            .fs_context("reading signed installer metadata", &signed)?
            .len();
        let checksum = calculate_sha256(&signed).await?;
        log::debug!("Signed installer: {} bytes, sha256 {}", size, checksum);
        Ok((signed, size, checksum))
    }
}

/// Runs `work` as `stage`, tagging any failure with the stage.
async fn in_stage<T>(stage: JobStage, work: impl Future<Output = Result<T>>) -> Result<T> {
    log::info!("==> {}", stage);
    work.await.map_err(|source| failed(stage, source))
}

fn failed(stage: JobStage, source: Error) -> Error {
    Error::Stage {
        stage,
        source: Box::new(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_are_lowercase() {
        let names: Vec<_> = [
            JobStage::Init,
            JobStage::Extract,
            JobStage::Stage,
            JobStage::Assemble,
            JobStage::Sign,
            JobStage::Upload,
            JobStage::Done,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();

        assert_eq!(
            names.join(" "),
            "init extract stage assemble sign upload done"
        );
    }

    #[tokio::test]
    async fn failures_carry_their_stage() {
        let err = in_stage(JobStage::Assemble, async {
            Err::<(), _>(Error::GenericError("boom".into()))
        })
        .await
        .unwrap_err();

        assert_eq!(err.stage(), Some(JobStage::Assemble));
        assert_eq!(err.to_string(), "assemble failed: boom");
        assert!(matches!(err.root_cause(), Error::GenericError(_)));
    }
}
