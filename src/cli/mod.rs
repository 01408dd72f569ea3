//! Command line interface for the SFX bundler.
//!
//! Two modes share one pipeline:
//! - local: paths on disk, signed installer written to `--outputFile`
//! - event: a cloud event JSON file, objects read from and written to storage

mod args;
mod output;

pub use args::{Args, RuntimeConfig, SignerChoice};
pub use output::OutputManager;

use crate::{
    bundler::{
        Pipeline, Settings, SigningTool, SystemRunner, builder::tool_detection::is_available,
        select_tool,
    },
    environment::{
        CloudEvent, CloudResponse, LocalEnvironment,
        cloud::{DirectoryObjectStore, HttpObjectStore},
        handle_event,
    },
    error::{BundlerError, CliError, Result},
};

/// Main CLI entry point
///
/// # Returns
///
/// Process exit code: 0 on success, 1 when the job failed.
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let config = RuntimeConfig::from(&args);

    match execute(&args, &config).await {
        Ok(code) => Ok(code),
        Err(e) => {
            report_error(&config, &e)?;
            Ok(1)
        }
    }
}

async fn execute(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    args.validate()?;
    let settings = args.settings()?;
    let runner = SystemRunner::with_timeout(settings.tool_timeout());

    let tools = settings.tools();
    config.verbose_println(&format!("Host: {}", settings.host()))?;
    config.verbose_println(&format!("7-Zip: {}", tools.seven_zip.display()))?;
    config.verbose_println(&format!("SFX module: {}", tools.sfx_module.display()))?;
    preflight(config, &settings)?;

    match &args.event {
        Some(event_path) => run_event(args, config, &settings, runner, event_path).await,
        None => run_local(args, config, settings, runner).await,
    }
}

async fn run_local(
    args: &Args,
    config: &RuntimeConfig,
    settings: Settings,
    runner: SystemRunner,
) -> Result<i32> {
    if args.password_as_argument {
        config.warn("the certificate password is visible in the process list")?;
    }

    config.section(&format!("Building {}", settings.title()))?;
    let (input, msi) = (args.input_file.display(), args.msi_file.display());
    config.progress(&format!("{input} + {msi}"))?;

    let env = LocalEnvironment::new(
        &args.input_file,
        &args.msi_file,
        &args.cert_file,
        args.cert_password.as_str(),
        &args.output_file,
    );
    let report = Pipeline::new(settings, runner).run(&env).await?;

    let delivered = report.delivery.to_string();
    config.success(&format!("SFX archive created and signed: {delivered}"))?;
    config.indent(&format!(
        "{} bytes (stub {} + config {} + archive {} before signing)",
        report.signed_size,
        report.assembly.stub_len,
        report.assembly.config_len,
        report.assembly.archive_len
    ))?;
    config.indent(&format!("sha256 {}", report.checksum))?;
    Ok(0)
}

async fn run_event(
    args: &Args,
    config: &RuntimeConfig,
    settings: &Settings,
    runner: SystemRunner,
    event_path: &std::path::Path,
) -> Result<i32> {
    let text = tokio::fs::read_to_string(event_path).await.map_err(|e| {
        CliError::ExecutionFailed {
            command: format!("read {}", event_path.display()),
            reason: e.to_string(),
        }
    })?;
    let event = CloudEvent::from_json(&text)?;
    let (bucket, key) = (&event.output_bucket, &event.output_key);
    config.section(&format!("Handling event {bucket}/{key}"))?;

    let response = match (&args.storage_dir, &args.storage_endpoint) {
        (Some(dir), _) => {
            handle_event(event, DirectoryObjectStore::new(dir), settings, runner).await
        }
        (None, Some(endpoint)) => {
            let store = HttpObjectStore::new(endpoint, args.storage_token.clone())?;
            handle_event(event, store, settings, runner).await
        }
        (None, None) => {
            return Err(CliError::MissingArgument {
                argument: "--storage-endpoint or --storage-dir".to_string(),
            }
            .into());
        }
    };

    println!("{}", serde_json::to_string(&response)?);
    report_response(config, &response)?;
    Ok(if response.is_success() { 0 } else { 1 })
}

/// Warns about tools that will fail to spawn. The job still runs so the
/// error names the exact program.
fn preflight(config: &RuntimeConfig, settings: &Settings) -> Result<()> {
    let tools = settings.tools();
    let signer = match select_tool(settings.host(), settings.signing().tool) {
        Ok(SigningTool::Osslsigncode) => Some(&tools.osslsigncode),
        Ok(SigningTool::Signtool) => Some(&tools.signtool),
        Err(_) => None,
    };
    for program in std::iter::once(&tools.seven_zip).chain(signer) {
        if !is_available(program) {
            config.warn(&format!("{} not found", program.display()))?;
        }
    }
    Ok(())
}

fn report_response(config: &RuntimeConfig, response: &CloudResponse) -> Result<()> {
    if response.is_success() {
        config.success("Event handled")?;
    } else {
        config.error(&response.body)?;
    }
    Ok(())
}

fn report_error(config: &RuntimeConfig, error: &BundlerError) -> Result<()> {
    log::error!("{}", error);
    config.error(&error.to_string())?;
    for suggestion in error.recovery_suggestions() {
        config.indent(&suggestion)?;
    }
    Ok(())
}
