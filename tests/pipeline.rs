mod support;

use sfx_bundler::{
    bundler::{Error, HostOs, JobStage, PasswordTransport, Pipeline, SigningSettings, SigningTool},
    environment::{Delivery, LocalEnvironment},
};
use support::{FakeToolRunner, Fixture, SIGNATURE, STUB};

fn local_env(fx: &Fixture) -> LocalEnvironment {
    LocalEnvironment::new(&fx.input_zip, &fx.msi, &fx.cert, "s3cret", &fx.output)
}

#[tokio::test]
async fn builds_signed_installer_from_extension_zip() {
    let fx = Fixture::new(&[
        ("manifest.json", r#"{"manifest_version":3}"#),
        ("index.html", "<html></html>"),
    ]);
    let runner = FakeToolRunner::new();
    let pipeline = Pipeline::new(fx.settings(HostOs::Other, None), runner.clone())
        .with_work_root(&fx.work_root);

    let report = pipeline.run(&local_env(&fx)).await.expect("job succeeds");

    assert_eq!(
        runner.archived_layouts(),
        vec![vec![
            "NewTabSetup.msi".to_string(),
            "build/".to_string(),
            "build/index.html".to_string(),
            "build/manifest.json".to_string(),
        ]]
    );
    assert_eq!(runner.tools_called(), vec!["7z", "7z", "osslsigncode"]);

    let assembly = &report.assembly;
    assert_eq!(
        assembly.total_len,
        assembly.stub_len + assembly.config_len + assembly.archive_len
    );
    assert_eq!(assembly.stub_len, STUB.len() as u64);

    let delivered = std::fs::read(&fx.output).expect("output written");
    assert_eq!(report.delivery, Delivery::File(fx.output.clone()));
    assert_eq!(
        delivered.len() as u64,
        assembly.total_len + SIGNATURE.len() as u64
    );
    assert_eq!(report.signed_size, delivered.len() as u64);
    assert!(delivered.starts_with(STUB));
    assert!(delivered.ends_with(SIGNATURE));
    let text = String::from_utf8_lossy(&delivered);
    assert!(text.contains(";!@Install@!UTF-8!\nTitle=\"New Tab Setup\"\n"));
    assert!(text.contains("ExecuteParameters=\"/i NewTabSetup.msi\""));
    assert_eq!(report.checksum.len(), 64);

    assert!(fx.work_root_is_empty(), "work directory removed");
}

#[tokio::test]
async fn password_never_reaches_the_command_line_by_default() {
    let fx = Fixture::new(&[("manifest.json", "{}")]);
    let runner = FakeToolRunner::new();
    let pipeline = Pipeline::new(fx.settings(HostOs::Other, None), runner.clone())
        .with_work_root(&fx.work_root);

    pipeline.run(&local_env(&fx)).await.expect("job succeeds");

    let sign = runner
        .calls()
        .into_iter()
        .find(|c| c.tool() == "osslsigncode")
        .expect("signed");
    assert!(sign.value_after("-readpass").is_some());
    assert!(!sign.args_lossy().iter().any(|a| a == "s3cret"));
    assert_eq!(
        sign.value_after("-n").and_then(|v| v.to_str()),
        Some("New Tab Setup")
    );
    assert_eq!(sign.get_envs().len(), 1);
}

#[tokio::test]
async fn empty_password_reaches_every_signer() {
    let cases = [
        (HostOs::Other, PasswordTransport::TransientFile),
        (HostOs::Other, PasswordTransport::Argument),
        (HostOs::Windows, PasswordTransport::TransientFile),
    ];
    for (host, password_transport) in cases {
        let fx = Fixture::new(&[("manifest.json", "{}")]);
        let runner = FakeToolRunner::new();
        let settings = fx.settings_with(
            host,
            SigningSettings {
                password_transport,
                ..Default::default()
            },
        );
        let pipeline = Pipeline::new(settings, runner.clone()).with_work_root(&fx.work_root);
        let env = LocalEnvironment::new(&fx.input_zip, &fx.msi, &fx.cert, "", &fx.output);

        pipeline
            .run(&env)
            .await
            .expect("passwordless certificate signs");

        assert_eq!(runner.passwords_seen(), vec![String::new()]);
        assert!(fx.output.exists());
    }
}

#[tokio::test]
async fn missing_installer_aborts_before_any_tool_runs() {
    let fx = Fixture::new(&[("manifest.json", "{}")]);
    std::fs::remove_file(&fx.msi).expect("remove msi");
    let runner = FakeToolRunner::new();
    let pipeline = Pipeline::new(fx.settings(HostOs::Other, None), runner.clone())
        .with_work_root(&fx.work_root);

    let err = pipeline.run(&local_env(&fx)).await.unwrap_err();

    assert_eq!(err.stage(), Some(JobStage::Init));
    assert!(matches!(
        err.root_cause(),
        Error::InputNotFound {
            what: "installer file",
            ..
        }
    ));
    assert!(err.to_string().contains("installer file not found"));
    assert!(runner.calls().is_empty());
    assert!(!fx.output.exists());
    assert!(fx.work_root_is_empty(), "work directory removed");
}

#[tokio::test]
async fn missing_stub_is_reported_during_init() {
    let fx = Fixture::new(&[("manifest.json", "{}")]);
    std::fs::remove_file(&fx.stub).expect("remove stub");
    let runner = FakeToolRunner::new();
    let pipeline = Pipeline::new(fx.settings(HostOs::Other, None), runner.clone())
        .with_work_root(&fx.work_root);

    let err = pipeline.run(&local_env(&fx)).await.unwrap_err();

    assert_eq!(err.stage(), Some(JobStage::Init));
    assert!(matches!(
        err.root_cause(),
        Error::InputNotFound {
            what: "SFX module",
            ..
        }
    ));
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn extraction_failure_stops_the_job_and_cleans_up() {
    let fx = Fixture::new(&[("manifest.json", "{}")]);
    let runner = FakeToolRunner::failing("7z");
    let pipeline = Pipeline::new(fx.settings(HostOs::Other, None), runner.clone())
        .with_work_root(&fx.work_root);

    let err = pipeline.run(&local_env(&fx)).await.unwrap_err();

    assert_eq!(err.stage(), Some(JobStage::Extract));
    assert!(matches!(err.root_cause(), Error::CommandStatus { code: Some(2), .. }));
    assert_eq!(runner.tools_called(), vec!["7z"]);
    assert!(fx.work_root_is_empty());
}

#[tokio::test]
async fn extension_with_its_own_temp_directory_is_packaged_intact() {
    let fx = Fixture::new(&[
        ("manifest.json", "{}"),
        ("temp/cache.json", "[]"),
    ]);
    let runner = FakeToolRunner::new();
    let pipeline = Pipeline::new(fx.settings(HostOs::Other, None), runner.clone())
        .with_work_root(&fx.work_root);

    pipeline.run(&local_env(&fx)).await.expect("job succeeds");

    assert_eq!(
        runner.archived_layouts(),
        vec![vec![
            "NewTabSetup.msi".to_string(),
            "build/".to_string(),
            "build/manifest.json".to_string(),
            "build/temp/".to_string(),
            "build/temp/cache.json".to_string(),
        ]]
    );
}

#[tokio::test]
async fn windows_hosts_sign_with_signtool() {
    let fx = Fixture::new(&[("index.html", "<html></html>")]);
    let runner = FakeToolRunner::new();
    let pipeline = Pipeline::new(fx.settings(HostOs::Windows, None), runner.clone())
        .with_work_root(&fx.work_root);

    let report = pipeline.run(&local_env(&fx)).await.expect("job succeeds");

    assert_eq!(runner.tools_called(), vec!["7z", "7z", "signtool"]);
    let sign = runner.calls().pop().expect("signtool call");
    assert!(sign.to_string().contains("/p ****"));
    assert_eq!(
        report.signed_size,
        report.assembly.total_len + SIGNATURE.len() as u64
    );
}

#[tokio::test]
async fn signtool_on_other_hosts_fails_fast() {
    let fx = Fixture::new(&[("index.html", "<html></html>")]);
    let runner = FakeToolRunner::new();
    let pipeline = Pipeline::new(
        fx.settings(HostOs::Other, Some(SigningTool::Signtool)),
        runner.clone(),
    )
    .with_work_root(&fx.work_root);

    let err = pipeline.run(&local_env(&fx)).await.unwrap_err();

    assert_eq!(err.stage(), Some(JobStage::Sign));
    assert!(matches!(err.root_cause(), Error::Unsupported { .. }));
    assert!(!runner.tools_called().contains(&"signtool"));
    assert!(!fx.output.exists());
    assert!(fx.work_root_is_empty());
}
