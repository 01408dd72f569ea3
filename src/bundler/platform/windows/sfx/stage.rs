//! Archive staging.
//!
//! The SFX config runs `msiexec /i <installer>` from the extraction root, and
//! the installer's custom action copies `build\` next to it into the profile.
//! Staging rearranges an extracted extension tree into that shape:
//!
//! ```text
//! <source>/temp/
//! ├── build/            every original top-level entry of <source>
//! └── NewTabSetup.msi
//! ```

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    utils::fs,
};
use std::{
    io,
    path::{Path, PathBuf},
};

/// Preferred name of the staging root inside the source tree.
pub const STAGING_DIR: &str = "temp";

/// Directory holding the extension payload inside the staging root.
pub const BUILD_DIR: &str = "build";

/// Bound on `temp-N` names tried when `temp` is taken.
const MAX_STAGING_ATTEMPTS: usize = 1000;

/// Stages `source_tree` and `installer` for re-archiving.
///
/// # Process
///
/// 1. Reserve a fresh staging root in the source tree (`temp`, or `temp-N`
///    when the extracted payload already has an entry called `temp`)
/// 2. Create `build/` inside it
/// 3. Move every top-level entry of the source tree except the staging root
///    itself into `build/`
/// 4. Copy the installer to the staging root as `installer_name`
///
/// # Returns
///
/// Path of the staging root.
///
/// # Errors
///
/// Any filesystem failure aborts staging. Entries already moved are not
/// moved back.
pub async fn stage(source_tree: &Path, installer: &Path, installer_name: &str) -> Result<PathBuf> {
    if !fs::is_file(installer).await {
        return Err(Error::InputNotFound {
            what: "installer file",
            path: installer.to_path_buf(),
        });
    }

    let staging_root = reserve_staging_root(source_tree).await?;
    let build_dir = staging_root.join(BUILD_DIR);
    fs::create_dir(&build_dir, false).await?;

    // Snapshot the listing first; moving entries while iterating the same
    // directory is unspecified.
    let mut entries = Vec::new();
    let mut dir = tokio::fs::read_dir(source_tree)
        .await
        .fs_context("listing extracted tree", source_tree)?;
    while let Some(entry) = dir
        .next_entry()
        .await
        .fs_context("listing extracted tree", source_tree)?
    {
        entries.push(entry);
    }

    let mut moved = 0usize;
    for entry in entries {
        let path = entry.path();
        if path == staging_root {
            continue;
        }
        fs::move_entry(&path, &build_dir.join(entry.file_name())).await?;
        moved += 1;
    }

    fs::copy_file(installer, &staging_root.join(installer_name)).await?;

    log::info!(
        "Staged {} entries under {} with {}",
        moved,
        build_dir.display(),
        installer_name
    );

    Ok(staging_root)
}

/// Creates the staging root, never reusing an existing entry.
async fn reserve_staging_root(source_tree: &Path) -> Result<PathBuf> {
    for attempt in 0..MAX_STAGING_ATTEMPTS {
        let name = if attempt == 0 {
            STAGING_DIR.to_string()
        } else {
            format!("{STAGING_DIR}-{attempt}")
        };
        let candidate = source_tree.join(&name);

        match tokio::fs::create_dir(&candidate).await {
            Ok(()) => {
                if attempt > 0 {
                    log::warn!(
                        "Extracted tree already contains '{}'; staging under '{}'",
                        STAGING_DIR,
                        name
                    );
                }
                return Ok(candidate);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e).fs_context("creating staging directory", &candidate),
        }
    }

    Err(Error::GenericError(format!(
        "no free staging directory name under {}",
        source_tree.display()
    )))
}

/// Checks that a staging root holds exactly one `build` directory and one
/// installer named `installer_name`, and nothing else.
///
/// The stub gives no feedback at install time when this shape is wrong, so
/// the check runs before archiving.
pub async fn verify_layout(staging_root: &Path, installer_name: &str) -> Result<()> {
    let invalid = |reason: String| Error::InvalidLayout {
        root: staging_root.to_path_buf(),
        reason,
    };

    let mut has_build = false;
    let mut has_installer = false;
    let mut dir = tokio::fs::read_dir(staging_root)
        .await
        .fs_context("listing staged tree", staging_root)?;
    while let Some(entry) = dir
        .next_entry()
        .await
        .fs_context("listing staged tree", staging_root)?
    {
        let file_type = entry
            .file_type()
            .await
            .fs_context("reading staged entry type", entry.path())?;
        let name = entry.file_name();

        if name == BUILD_DIR && file_type.is_dir() {
            has_build = true;
        } else if name == installer_name && file_type.is_file() {
            has_installer = true;
        } else {
            return Err(invalid(format!("unexpected entry '{}'", name.to_string_lossy())));
        }
    }

    if !has_build {
        return Err(invalid(format!("missing '{BUILD_DIR}' directory")));
    }
    if !has_installer {
        return Err(invalid(format!("missing installer '{installer_name}'")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;

    fn extracted_tree(root: &Path, files: &[&str]) -> PathBuf {
        let tree = root.join("build");
        for file in files {
            let path = tree.join(file);
            stdfs::create_dir_all(path.parent().expect("has parent")).expect("mkdir");
            stdfs::write(&path, file.as_bytes()).expect("write file");
        }
        tree
    }

    fn installer(root: &Path) -> PathBuf {
        let path = root.join("input.msi");
        stdfs::write(&path, b"MSI").expect("write installer");
        path
    }

    fn sorted_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = stdfs::read_dir(dir)
            .expect("read dir")
            .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn moves_every_entry_under_build_and_adds_installer() {
        let dir = tempfile::tempdir().expect("temp dir");
        let tree = extracted_tree(
            dir.path(),
            &["manifest.json", "index.html", "images/bg.png", "js/newtab.js"],
        );
        let msi = installer(dir.path());

        let root = stage(&tree, &msi, "NewTabSetup.msi")
            .await
            .expect("staging");

        assert_eq!(root, tree.join("temp"));
        assert_eq!(sorted_names(&root), vec!["NewTabSetup.msi", "build"]);
        assert_eq!(
            sorted_names(&root.join("build")),
            vec!["images", "index.html", "js", "manifest.json"]
        );
        assert!(root.join("build/images/bg.png").is_file());
        assert_eq!(sorted_names(&tree), vec!["temp"]);
        assert_eq!(
            stdfs::read(root.join("NewTabSetup.msi")).expect("msi"),
            b"MSI"
        );
        assert!(msi.exists(), "installer is copied, not moved");
        verify_layout(&root, "NewTabSetup.msi")
            .await
            .expect("valid layout");
    }

    #[tokio::test]
    async fn pre_existing_temp_directory_is_moved_not_reused() {
        let dir = tempfile::tempdir().expect("temp dir");
        let tree = extracted_tree(dir.path(), &["manifest.json", "temp/cache.json"]);
        let msi = installer(dir.path());

        let root = stage(&tree, &msi, "NewTabSetup.msi")
            .await
            .expect("staging");

        assert_eq!(root, tree.join("temp-1"));
        assert_eq!(sorted_names(&tree), vec!["temp-1"]);
        assert_eq!(
            sorted_names(&root.join("build")),
            vec!["manifest.json", "temp"]
        );
        assert!(root.join("build/temp/cache.json").is_file());
        verify_layout(&root, "NewTabSetup.msi")
            .await
            .expect("valid layout");
    }

    #[tokio::test]
    async fn pre_existing_temp_file_is_kept_in_payload() {
        let dir = tempfile::tempdir().expect("temp dir");
        let tree = extracted_tree(dir.path(), &["temp", "temp-1", "index.html"]);
        let msi = installer(dir.path());

        let root = stage(&tree, &msi, "NewTabSetup.msi")
            .await
            .expect("staging");

        assert_eq!(root, tree.join("temp-2"));
        assert_eq!(
            sorted_names(&root.join("build")),
            vec!["index.html", "temp", "temp-1"]
        );
        assert_eq!(stdfs::read(root.join("build/temp")).expect("file"), b"temp");
    }

    #[tokio::test]
    async fn empty_tree_still_gets_build_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let tree = dir.path().join("build");
        stdfs::create_dir_all(&tree).expect("mkdir");
        let msi = installer(dir.path());

        let root = stage(&tree, &msi, "NewTabSetup.msi")
            .await
            .expect("staging");

        assert!(sorted_names(&root.join("build")).is_empty());
        verify_layout(&root, "NewTabSetup.msi")
            .await
            .expect("valid layout");
    }

    #[tokio::test]
    async fn missing_installer_fails_before_touching_tree() {
        let dir = tempfile::tempdir().expect("temp dir");
        let tree = extracted_tree(dir.path(), &["manifest.json"]);

        let err = stage(&tree, &dir.path().join("missing.msi"), "NewTabSetup.msi")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::InputNotFound {
                what: "installer file",
                ..
            }
        ));
        assert_eq!(sorted_names(&tree), vec!["manifest.json"]);
    }

    #[tokio::test]
    async fn verify_layout_rejects_extra_entries() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = dir.path();
        stdfs::create_dir(root.join("build")).expect("mkdir");
        stdfs::write(root.join("NewTabSetup.msi"), b"MSI").expect("msi");
        stdfs::write(root.join("stray.txt"), b"x").expect("stray");

        let err = verify_layout(root, "NewTabSetup.msi").await.unwrap_err();

        assert!(matches!(err, Error::InvalidLayout { .. }));
    }

    #[tokio::test]
    async fn verify_layout_requires_installer() {
        let dir = tempfile::tempdir().expect("temp dir");
        stdfs::create_dir(dir.path().join("build")).expect("mkdir");

        let err = verify_layout(dir.path(), "NewTabSetup.msi")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("missing installer"));
    }
}
