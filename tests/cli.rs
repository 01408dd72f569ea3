use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn bundler() -> Command {
    let mut cmd = Command::cargo_bin("sfx_bundler").expect("binary built");
    cmd.env_remove("SFX_CERT_PASSWORD")
        .env_remove("SFX_STORAGE_ENDPOINT")
        .env_remove("SFX_STORAGE_TOKEN")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn help_lists_the_legacy_flags() {
    bundler()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--inputFile")
                .and(predicate::str::contains("--msiFile"))
                .and(predicate::str::contains("--certFile"))
                .and(predicate::str::contains("--certPassword"))
                .and(predicate::str::contains("--outputFile"))
                .and(predicate::str::contains("--sfxModulePath")),
        );
}

#[test]
fn missing_installer_exits_non_zero_and_leaves_no_work_dir() {
    let dir = tempfile::tempdir().expect("temp dir");
    let tmp = dir.path().join("tmp");
    fs::create_dir(&tmp).expect("tmp");
    fs::write(dir.path().join("input.zip"), b"PK\x05\x06").expect("zip");
    fs::write(dir.path().join("Certificate.pfx"), b"PFX").expect("cert");
    fs::write(dir.path().join("7zSD.sfx"), b"MZ").expect("stub");

    bundler()
        .current_dir(dir.path())
        .env("TMPDIR", &tmp)
        .args([
            "--seven-zip",
            "/nonexistent/7za",
            "--osslsigncode",
            "/nonexistent/osslsigncode",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("installer file not found"));

    assert!(fs::read_dir(&tmp).expect("tmp").next().is_none());
    assert!(!dir.path().join("NewTabSetup.exe").exists());
}

#[test]
fn empty_certificate_password_gets_past_validation() {
    let dir = tempfile::tempdir().expect("temp dir");
    let tmp = dir.path().join("tmp");
    fs::create_dir(&tmp).expect("tmp");
    fs::write(dir.path().join("input.zip"), b"PK\x05\x06").expect("zip");
    fs::write(dir.path().join("NewTabSetup.msi"), b"MSI").expect("msi");
    fs::write(dir.path().join("Certificate.pfx"), b"PFX").expect("cert");
    fs::write(dir.path().join("7zSD.sfx"), b"MZ").expect("stub");

    bundler()
        .current_dir(dir.path())
        .env("TMPDIR", &tmp)
        .args(["--certPassword", "", "--seven-zip", "/nonexistent/7za"])
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("extract failed")
                .and(predicate::str::contains("must not be empty").not()),
        );

    assert!(fs::read_dir(&tmp).expect("tmp").next().is_none());
}

#[test]
fn event_mode_requires_storage() {
    bundler()
        .args(["--event", "event.json"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--storage-endpoint or --storage-dir"));
}

#[test]
fn event_with_missing_objects_prints_500_response() {
    let dir = tempfile::tempdir().expect("temp dir");
    let event = dir.path().join("event.json");
    fs::write(
        &event,
        r#"{
            "inputBucket": "uploads", "inputKey": "build.zip",
            "msiBucket": "installers", "msiKey": "NewTabSetup.msi",
            "certBucket": "secrets", "certKey": "codesign.pfx",
            "certPassword": "s3cret",
            "outputBucket": "releases", "outputKey": "NewTabSetup.exe"
        }"#,
    )
    .expect("event");
    fs::create_dir(dir.path().join("objects")).expect("objects");

    bundler()
        .arg("--event")
        .arg(&event)
        .arg("--storage-dir")
        .arg(dir.path().join("objects"))
        .assert()
        .code(1)
        .stdout(
            predicate::str::contains(r#""statusCode":500"#)
                .and(predicate::str::contains("no such object uploads/build.zip")),
        )
        .stdout(predicate::str::contains("s3cret").not());
}
