use crate::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Clone, Copy, Debug)]
pub struct ReplaceDirOptions {
    pub retry_count: u32,
    pub retry_delay: Duration,
    pub overwrite: bool,
}

impl Default for ReplaceDirOptions {
    fn default() -> Self {
        Self {
            retry_count: 5,
            retry_delay: Duration::from_millis(100),
            overwrite: true,
        }
    }
}

impl ReplaceDirOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

/// Directory operations `replace_dir` is built from.
trait DirOps {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;
}

struct StdDirOps;

impl DirOps for StdDirOps {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path)
    }
}

/// Move `src` to `dest`, replacing whatever directory is at `dest`.
///
/// An existing destination is first renamed aside, then `src` is renamed
/// into place and the old tree removed. If the second rename fails the old
/// tree is restored, so `dest` is never observed half-populated.
///
/// # Errors
///
/// - [`Error::RestoreFailed`]: `src` could not be moved in and the previous
///   tree could not be moved back; it remains at the reported backup path.
/// - [`Error::BackupCleanup`]: `dest` holds the new tree, but the previous
///   tree could not be removed from the reported backup path.
pub fn replace_dir(
    src: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    options: ReplaceDirOptions,
) -> Result<()> {
    replace_dir_with(&StdDirOps, src.as_ref(), dest.as_ref(), &options)
}

fn replace_dir_with(
    ops: &impl DirOps,
    src: &Path,
    dest: &Path,
    options: &ReplaceDirOptions,
) -> Result<()> {
    if fs::symlink_metadata(dest).is_err() {
        return rename_with_retry(ops, src, dest, options);
    }

    if !options.overwrite {
        return Err(Error::AlreadyExists {
            path: dest.to_path_buf(),
        });
    }

    let backup = backup_path(dest);
    rename_with_retry(ops, dest, &backup, options)?;

    if let Err(e) = rename_with_retry(ops, src, dest, options) {
        return match ops.rename(&backup, dest) {
            Ok(()) => Err(e),
            Err(source) => Err(Error::RestoreFailed {
                path: backup,
                destination: dest.to_path_buf(),
                source,
            }),
        };
    }

    ops.remove_dir_all(&backup)
        .map_err(|source| Error::BackupCleanup {
            path: backup,
            destination: dest.to_path_buf(),
            source,
        })
}

fn backup_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{}.old-{}", name, uuid::Uuid::new_v4()))
}

#[cfg(not(windows))]
fn rename_with_retry(
    ops: &impl DirOps,
    src: &Path,
    dest: &Path,
    _options: &ReplaceDirOptions,
) -> Result<()> {
    ops.rename(src, dest).map_err(|e| Error::ReplaceDir {
        path: dest.to_path_buf(),
        source: e,
    })
}

// Virus scanners and indexers hold short-lived handles on Windows.
#[cfg(windows)]
fn rename_with_retry(
    ops: &impl DirOps,
    src: &Path,
    dest: &Path,
    options: &ReplaceDirOptions,
) -> Result<()> {
    use std::thread;

    let mut attempts = 0;
    loop {
        match ops.rename(src, dest) {
            Ok(()) => return Ok(()),
            Err(e) => {
                attempts += 1;
                if attempts >= options.retry_count {
                    return Err(Error::ReplaceDir {
                        path: dest.to_path_buf(),
                        source: e,
                    });
                }
                thread::sleep(options.retry_delay * attempts);
            }
        }
    }
}
