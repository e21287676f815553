use crate::{Error, ReplaceDirOptions, Result};
use std::path::{Path, PathBuf};

/// A staging directory that is promoted to its destination on commit.
///
/// Dropping an uncommitted workspace removes the staging directory and
/// everything written into it.
pub struct Workspace {
    staging_path: PathBuf,
    destination_path: PathBuf,
    options: ReplaceDirOptions,
    committed: bool,
}

impl Workspace {
    pub fn new(staging_dir: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<Self> {
        let staging_path = staging_dir.as_ref().to_path_buf();
        let destination_path = destination.as_ref().to_path_buf();

        if !staging_path.exists() {
            std::fs::create_dir_all(&staging_path).map_err(|e| Error::Write {
                path: staging_path.clone(),
                source: e,
            })?;
        }

        Ok(Self {
            staging_path,
            destination_path,
            options: ReplaceDirOptions::default(),
            committed: false,
        })
    }

    pub fn with_options(mut self, options: ReplaceDirOptions) -> Self {
        self.options = options;
        self
    }

    pub fn path(&self) -> &Path {
        &self.staging_path
    }

    pub fn destination(&self) -> &Path {
        &self.destination_path
    }

    /// Map a path under the destination to the same location in staging.
    pub fn staged(&self, destination_path: &Path) -> Option<PathBuf> {
        destination_path
            .strip_prefix(&self.destination_path)
            .ok()
            .map(|relative| self.staging_path.join(relative))
    }

    pub fn commit(mut self) -> Result<PathBuf> {
        crate::replace_dir(&self.staging_path, &self.destination_path, self.options)?;
        self.committed = true;
        Ok(self.destination_path.clone())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_dir_all(&self.staging_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_workspace() {
        let dir = tempdir().unwrap();
        let staging = dir.path().join("staging");
        let dest = dir.path().join("dest");
        let workspace = Workspace::new(&staging, &dest).unwrap();
        std::fs::write(staging.join("file.txt"), "data").unwrap();
        let committed = workspace.commit().unwrap();
        assert_eq!(committed, dest);
        assert!(dest.join("file.txt").exists());
        assert!(!staging.exists());
    }

    #[test]
    fn test_workspace_cleanup_on_drop() {
        let dir = tempdir().unwrap();
        let staging = dir.path().join("staging");
        {
            let _workspace = Workspace::new(&staging, dir.path().join("dest")).unwrap();
            std::fs::write(staging.join("file.txt"), "data").unwrap();
            assert!(staging.exists());
        }
        assert!(!staging.exists());
        assert!(!dir.path().join("dest").exists());
    }

    #[test]
    fn test_workspace_staged_mapping() {
        let dir = tempdir().unwrap();
        let staging = dir.path().join("staging");
        let dest = dir.path().join("dest");
        let workspace = Workspace::new(&staging, &dest).unwrap();

        assert_eq!(
            workspace.staged(&dest.join("figs/a.png")),
            Some(staging.join("figs/a.png"))
        );
        assert_eq!(workspace.staged(&dest), Some(staging.clone()));
        assert_eq!(workspace.staged(Path::new("/elsewhere/a.png")), None);
    }

    #[test]
    fn test_workspace_commit_without_overwrite() {
        let dir = tempdir().unwrap();
        let staging = dir.path().join("staging");
        let dest = dir.path().join("dest");
        std::fs::create_dir_all(&dest).unwrap();

        let workspace = Workspace::new(&staging, &dest)
            .unwrap()
            .with_options(ReplaceDirOptions::new().overwrite(false));
        let result = workspace.commit();
        assert!(matches!(result, Err(Error::AlreadyExists { .. })));
        assert!(!staging.exists());
    }
}
