//! Shared fixtures for integration tests.
//!
//! [`FakeToolRunner`] stands in for 7-Zip and the signing tools:
//! - `7z x` unpacks the zip with the `zip` crate
//! - `7z a` records the staged layout and writes it out as the "archive"
//! - `osslsigncode` / `signtool` append [`SIGNATURE`] to the executable

#![allow(dead_code)]

use sfx_bundler::bundler::{
    Error, HostOs, Invocation, Result, Settings, SettingsBuilder, SigningSettings, SigningTool,
    ToolPaths, ToolRunner,
};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

/// Bytes the fake signers append.
pub const SIGNATURE: &[u8] = b"<authenticode>";

/// Bytes of the fake SFX stub.
pub const STUB: &[u8] = b"MZ\x90\x00fake-7zSD-stub";

#[derive(Clone, Default)]
pub struct FakeToolRunner {
    calls: Arc<Mutex<Vec<Invocation>>>,
    archived: Arc<Mutex<Vec<Vec<String>>>>,
    passwords: Arc<Mutex<Vec<String>>>,
    fail_on: Option<&'static str>,
}

impl FakeToolRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every invocation of `tool` exit with status 2.
    pub fn failing(tool: &'static str) -> Self {
        Self {
            fail_on: Some(tool),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn tools_called(&self) -> Vec<&'static str> {
        self.calls().iter().map(Invocation::tool).collect()
    }

    /// Relative paths seen by each `7z a`, sorted, `/`-separated.
    pub fn archived_layouts(&self) -> Vec<Vec<String>> {
        self.archived.lock().expect("lock").clone()
    }

    /// Certificate passwords the signers received, however they were passed.
    pub fn passwords_seen(&self) -> Vec<String> {
        self.passwords.lock().expect("lock").clone()
    }

    fn record_password(&self, password: String) {
        self.passwords.lock().expect("lock").push(password);
    }
}

impl ToolRunner for FakeToolRunner {
    async fn run(&self, invocation: &Invocation) -> Result<()> {
        self.calls.lock().expect("lock").push(invocation.clone());

        if self.fail_on == Some(invocation.tool()) {
            return Err(Error::CommandStatus {
                command: invocation.tool().to_string(),
                code: Some(2),
                stderr: "simulated failure".to_string(),
            });
        }

        let args = invocation.args_lossy();
        match (invocation.tool(), args.first().map(String::as_str)) {
            ("7z", Some("x")) => {
                let out_dir = args[2].strip_prefix("-o").expect("-o flag");
                unzip(Path::new(&args[1]), Path::new(out_dir));
            }
            ("7z", Some("a")) => {
                let root = Path::new(&args[2]).parent().expect("wildcard parent");
                let layout = list_tree(root);
                fs::write(&args[1], layout.join("\n")).expect("write archive");
                self.archived.lock().expect("lock").push(layout);
            }
            ("osslsigncode", _) => {
                let password = match invocation.value_after("-readpass") {
                    Some(file) => fs::read_to_string(file).expect("read password file"),
                    None => invocation
                        .value_after("-pass")
                        .expect("-pass")
                        .to_string_lossy()
                        .into_owned(),
                };
                self.record_password(password);
                let input = invocation.value_after("-in").expect("-in");
                let output = invocation.value_after("-out").expect("-out");
                let mut bytes = fs::read(input).expect("read unsigned");
                bytes.extend_from_slice(SIGNATURE);
                fs::write(output, bytes).expect("write signed");
            }
            ("signtool", _) => {
                let password = invocation.value_after("/p").expect("/p");
                self.record_password(password.to_string_lossy().into_owned());
                let target = args.last().expect("file to sign");
                let mut file = fs::OpenOptions::new()
                    .append(true)
                    .open(target)
                    .expect("open for signing");
                file.write_all(SIGNATURE).expect("append signature");
            }
            (tool, _) => panic!("unexpected tool {tool}: {invocation}"),
        }
        Ok(())
    }
}

fn unzip(archive: &Path, out_dir: &Path) {
    let file = fs::File::open(archive).expect("open zip");
    let mut zip = zip::ZipArchive::new(file).expect("valid zip");
    zip.extract(out_dir).expect("extract zip");
}

fn list_tree(root: &Path) -> Vec<String> {
    fn walk(dir: &Path, root: &Path, out: &mut Vec<String>) {
        for entry in fs::read_dir(dir).expect("read dir") {
            let path = entry.expect("entry").path();
            let rel = path
                .strip_prefix(root)
                .expect("under root")
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            if path.is_dir() {
                out.push(format!("{rel}/"));
                walk(&path, root, out);
            } else {
                out.push(rel);
            }
        }
    }

    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}

/// Writes a zip holding `files` (name, content).
pub fn write_zip(path: &Path, files: &[(&str, &str)]) {
    let file = fs::File::create(path).expect("create zip");
    let mut zip = zip::ZipWriter::new(file);
    for (name, content) in files {
        zip.start_file(*name, zip::write::SimpleFileOptions::default())
            .expect("start entry");
        zip.write_all(content.as_bytes()).expect("write entry");
    }
    zip.finish().expect("finish zip");
}

/// Inputs of one job laid out in a temp directory.
pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub input_zip: PathBuf,
    pub msi: PathBuf,
    pub cert: PathBuf,
    pub stub: PathBuf,
    pub output: PathBuf,
    pub work_root: PathBuf,
}

impl Fixture {
    pub fn new(files: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let input_zip = dir.path().join("input.zip");
        let msi = dir.path().join("NewTabSetup.msi");
        let cert = dir.path().join("Certificate.pfx");
        let stub = dir.path().join("7zSD.sfx");
        let work_root = dir.path().join("work");

        write_zip(&input_zip, files);
        fs::write(&msi, b"MSI-PAYLOAD").expect("msi");
        fs::write(&cert, b"PFX").expect("cert");
        fs::write(&stub, STUB).expect("stub");
        fs::create_dir(&work_root).expect("work root");

        Self {
            output: dir.path().join("dist").join("NewTabSetup.exe"),
            dir,
            input_zip,
            msi,
            cert,
            stub,
            work_root,
        }
    }

    pub fn tools(&self) -> ToolPaths {
        ToolPaths {
            seven_zip: PathBuf::from("7za"),
            osslsigncode: PathBuf::from("osslsigncode"),
            signtool: PathBuf::from("signtool"),
            sfx_module: self.stub.clone(),
            openssl_modules: Some(PathBuf::from("/opt/lib")),
        }
    }

    pub fn settings(&self, host: HostOs, tool: Option<SigningTool>) -> Settings {
        self.settings_with(
            host,
            SigningSettings {
                tool,
                ..Default::default()
            },
        )
    }

    pub fn settings_with(&self, host: HostOs, signing: SigningSettings) -> Settings {
        SettingsBuilder::new()
            .host(host)
            .tools(self.tools())
            .signing(signing)
            .build()
            .expect("valid settings")
    }

    pub fn work_root_is_empty(&self) -> bool {
        fs::read_dir(&self.work_root)
            .expect("work root")
            .next()
            .is_none()
    }
}
