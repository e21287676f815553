use std::path::Path;

use astrocorpus_fs::{ReplaceDirOptions, Workspace};
use tracing::debug;

use crate::error::{Error, Result};
use crate::options::ExistingRoot;

const STAGING_PREFIX: &str = ".astrocorpus-staging-";

/// Create a staging workspace next to `root` so promotion is a rename.
///
/// Nothing is created when `ExistingRoot::Fail` and `root` already exists.
pub(crate) fn stage(root: &Path, existing: ExistingRoot) -> Result<Workspace> {
    if existing == ExistingRoot::Fail && std::fs::symlink_metadata(root).is_ok() {
        return Err(Error::RootExists {
            path: root.to_path_buf(),
        });
    }

    let parent = root.parent().ok_or_else(|| Error::InvalidPath {
        entry: root.to_path_buf(),
        reason: "extraction root has no parent directory",
    })?;
    std::fs::create_dir_all(parent).map_err(|e| Error::DirectoryCreationFailed {
        path: parent.to_path_buf(),
        source: e,
    })?;

    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)
        .map_err(|e| Error::ExtractionFailed {
            path: parent.to_path_buf(),
            source: e,
        })?
        .keep();

    debug!(staging = %staging.display(), root = %root.display(), "staging directory created");

    let options = ReplaceDirOptions::new().overwrite(existing == ExistingRoot::Replace);
    Ok(Workspace::new(&staging, root)?.with_options(options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_is_sibling_of_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("2411.00148");

        let workspace = stage(&root, ExistingRoot::Replace).unwrap();
        assert_eq!(workspace.path().parent(), Some(dir.path()));
        assert_eq!(workspace.destination(), root.as_path());
        assert!(
            workspace
                .path()
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with(STAGING_PREFIX)
        );
    }

    #[test]
    fn dropped_staging_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("2411.00148");
        {
            let workspace = stage(&root, ExistingRoot::Replace).unwrap();
            std::fs::write(workspace.path().join("paper.tex"), "x").unwrap();
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn existing_root_fails_before_staging() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("2411.00148");
        std::fs::create_dir_all(&root).unwrap();

        let result = stage(&root, ExistingRoot::Fail);
        assert!(matches!(result, Err(Error::RootExists { .. })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn nested_identifier_parent_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("astro-ph").join("0601001");

        let workspace = stage(&root, ExistingRoot::Replace).unwrap();
        assert!(dir.path().join("astro-ph").is_dir());
        drop(workspace);
    }
}
