//! Locates specification documents under a source root.
//!
//! Only the Resource Manager layout is walked:
//!
//! ```text
//! <root>/specification/<namespace>/resource-manager/<resource-namespace>/<stable|preview>/<version>/*.json
//! ```
//!
//! Every level is listed in file-name order, so the returned list is stable
//! across runs on an unchanged tree.

use std::ffi::OsStr;
use std::fs::{self, FileType};
use std::path::{Path, PathBuf};

use spec_validator_core::Stability;
use tracing::debug;

use crate::error::DiscoveryError;

pub const SPECIFICATION_DIR: &str = "specification";
pub const RESOURCE_MANAGER_DIR: &str = "resource-manager";

struct Entry {
    name: String,
    path: PathBuf,
    file_type: FileType,
}

impl Entry {
    fn is_dir(&self) -> bool {
        self.file_type.is_dir()
    }
}

/// Returns every specification document under `root`, in traversal order.
///
/// Directories other than `resource-manager` (below a namespace) and
/// `stable`/`preview` (below a resource namespace) are skipped. Nothing below
/// a version directory is recursed into.
///
/// # Errors
///
/// Returns [`DiscoveryError::ReadDir`] if any visited directory, including
/// `<root>/specification` itself, cannot be listed.
pub fn locate_spec_files(root: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let specification = root.join(SPECIFICATION_DIR);
    let mut files = Vec::new();

    for namespace in list_dir(&specification)?.into_iter().filter(Entry::is_dir) {
        for manager in list_dir(&namespace.path)? {
            if !manager.is_dir() || manager.name != RESOURCE_MANAGER_DIR {
                continue;
            }
            for resource in list_dir(&manager.path)?.into_iter().filter(Entry::is_dir) {
                for tier in list_dir(&resource.path)? {
                    if !tier.is_dir() || Stability::from_dir_name(&tier.name).is_none() {
                        continue;
                    }
                    for version in list_dir(&tier.path)?.into_iter().filter(Entry::is_dir) {
                        collect_documents(&version.path, &mut files)?;
                    }
                }
            }
        }
    }

    debug!(root = %root.display(), files = files.len(), "located specification files");
    Ok(files)
}

fn collect_documents(version_dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), DiscoveryError> {
    for entry in list_dir(version_dir)? {
        if !entry.is_dir() && entry.path.extension() == Some(OsStr::new("json")) {
            files.push(entry.path);
        }
    }
    Ok(())
}

/// Lists `dir` sorted by file name. Symlinks are reported as themselves.
fn list_dir(dir: &Path) -> Result<Vec<Entry>, DiscoveryError> {
    let read_err = |source: std::io::Error| DiscoveryError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let file_type = entry.file_type().map_err(read_err)?;
        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
            file_type,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "{}").unwrap();
    }

    fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_locate_follows_convention_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(root, "specification/b/resource-manager/B.Svc/stable/2020-01-01/b.json");
        touch(root, "specification/a/resource-manager/A.Svc/preview/2021-01-01-preview/z.json");
        touch(root, "specification/a/resource-manager/A.Svc/preview/2021-01-01-preview/a.json");
        touch(root, "specification/a/resource-manager/A.Svc/stable/2020-01-01/a.json");

        let files = locate_spec_files(root).unwrap();
        assert_eq!(
            relative(root, &files),
            vec![
                "specification/a/resource-manager/A.Svc/preview/2021-01-01-preview/a.json",
                "specification/a/resource-manager/A.Svc/preview/2021-01-01-preview/z.json",
                "specification/a/resource-manager/A.Svc/stable/2020-01-01/a.json",
                "specification/b/resource-manager/B.Svc/stable/2020-01-01/b.json",
            ]
        );
    }

    #[test]
    fn test_locate_skips_non_convention_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        touch(root, "specification/a/data-plane/A.Svc/stable/2020-01-01/a.json");
        touch(root, "specification/a/resource-manager/A.Svc/beta/2020-01-01/a.json");
        touch(root, "specification/a/resource-manager/A.Svc/stable/2020-01-01/notes.md");
        touch(root, "specification/a/resource-manager/A.Svc/stable/2020-01-01/examples/get.json");
        touch(root, "specification/a/resource-manager/A.Svc/stable/top-level.json");
        touch(root, "specification/a/resource-manager/readme.md");
        touch(root, "specification/a/resource-manager/A.Svc/preview");
        touch(root, "specification/readme.md");

        let files = locate_spec_files(root).unwrap();
        assert!(files.is_empty(), "unexpected files: {files:?}");
    }

    #[test]
    fn test_locate_empty_specification_directory() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join(SPECIFICATION_DIR)).unwrap();
        assert!(locate_spec_files(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_locate_missing_specification_directory_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = locate_spec_files(tmp.path()).unwrap_err();
        let DiscoveryError::ReadDir { path, .. } = err;
        assert_eq!(path, tmp.path().join(SPECIFICATION_DIR));
    }

    #[cfg(unix)]
    #[test]
    fn test_locate_unreadable_nested_directory_aborts() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        touch(
            tmp.path(),
            "specification/a/resource-manager/Microsoft.A/stable/2020-01-01/a.json",
        );
        let locked = tmp
            .path()
            .join("specification/b/resource-manager/Microsoft.B");
        fs::create_dir_all(locked.join("stable/2020-01-01")).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can list the directory anyway.
        let enforced = fs::read_dir(&locked).is_err();
        let result = locate_spec_files(tmp.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        if !enforced {
            return;
        }

        let DiscoveryError::ReadDir { path, .. } = result.unwrap_err();
        assert_eq!(path, locked);
    }
}
