//! Writing a validated plan to disk.
//!
//! Members are written into a staging directory beside the extraction root
//! and promoted with a single rename once every member is on disk. A failure
//! part-way drops the staging directory; the extraction root is untouched.
//!
//! # Platform Behavior
//!
//! **Unix**: regular files get the archive's mode bits masked to `0o777`,
//! always readable and writable by the owner.
//!
//! **Windows**: modes are ignored; symlinks are created as file or directory
//! links depending on what the validated target is.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use astrocorpus_fs::Workspace;
use tracing::{debug, trace, warn};

use crate::entry::{ExtractionPlan, MemberKind, ValidatedMember};
use crate::error::{Error, Result};
use crate::options::{ExtractOptions, Progress, Stage};
use crate::workspace::stage;

mod tar;

pub use self::tar::{GzTarArchive, TarSource, read_members};

const COPY_BUFFER_BYTES: usize = 64 * 1024;

/// Write every member of `plan` and promote the result to `plan.root()`.
///
/// The archive is re-read from `source`; its members must match the plan
/// one-for-one.
pub fn extract_plan(
    source: &TarSource,
    plan: &ExtractionPlan,
    options: &ExtractOptions,
) -> Result<PathBuf> {
    let workspace = stage(plan.root(), options.existing_root)?;
    let mut archive = source.open()?;

    let mut planned = plan.members().iter();
    let mut members_processed = 0usize;
    let mut bytes_processed = 0u64;

    for entry in archive.entries().map_err(|e| source.corrupted(e))? {
        let mut entry = entry.map_err(|e| source.corrupted(e))?;
        let member = self::tar::member_from_entry(&entry).map_err(|e| source.corrupted(e))?;

        let validated = planned
            .next()
            .filter(|validated| validated.member == member)
            .ok_or_else(|| Error::MemberMismatch {
                entry: member.path.clone(),
            })?;

        let target = workspace
            .staged(&validated.destination)
            .ok_or_else(|| Error::PathTraversal {
                entry: member.path.clone(),
                resolved: validated.destination.clone(),
            })?;

        write_member(&mut entry, validated, &target, &workspace, source)?;

        members_processed += 1;
        if member.kind == MemberKind::File {
            bytes_processed += member.size;
        }

        options.report(Progress {
            stage: Stage::Validated,
            members_processed,
            total_members: Some(plan.len()),
            bytes_processed,
            current_file: Some(member.path),
        });
    }

    if let Some(missing) = planned.next() {
        return Err(Error::MemberMismatch {
            entry: missing.member.path.clone(),
        });
    }

    let root = match workspace.commit() {
        Ok(root) => root,
        // The new tree is in place; only the previous one was not removed.
        Err(astrocorpus_fs::Error::BackupCleanup {
            path,
            destination,
            source,
        }) => {
            warn!(
                backup = %path.display(),
                error = %source,
                "previous extraction could not be removed"
            );
            destination
        }
        Err(e) => return Err(e.into()),
    };
    debug!(
        root = %root.display(),
        members = members_processed,
        bytes = bytes_processed,
        "extraction promoted"
    );
    Ok(root)
}

fn write_member<R: Read>(
    reader: &mut R,
    validated: &ValidatedMember,
    target: &Path,
    workspace: &Workspace,
    source: &TarSource,
) -> Result<()> {
    let member = &validated.member;
    match &member.kind {
        MemberKind::File => write_file(reader, target, member.mode, source),
        MemberKind::Directory => ensure_directory(target),
        MemberKind::Symlink { target: link_target } => {
            prepare_target(target)?;
            let resolved = validated
                .resolved_target
                .as_deref()
                .and_then(|resolved| workspace.staged(resolved));
            write_symlink(link_target, target, resolved.as_deref())
        }
        MemberKind::Hardlink { target: link_target } => {
            let original = validated
                .resolved_target
                .as_deref()
                .and_then(|resolved| workspace.staged(resolved))
                .ok_or_else(|| Error::HardlinkEscape {
                    entry: member.path.clone(),
                    target: link_target.clone(),
                    resolved: validated.destination.clone(),
                })?;
            prepare_target(target)?;
            fs::hard_link(&original, target).map_err(|e| Error::LinkCreationFailed {
                target: original,
                link: target.to_path_buf(),
                source: e,
            })
        }
        MemberKind::Unsupported { type_flag } => {
            warn!(
                entry = %member.path.display(),
                type_flag = *type_flag,
                "skipping unsupported archive member"
            );
            Ok(())
        }
    }
}

fn write_file<R: Read>(
    reader: &mut R,
    target: &Path,
    mode: Option<u32>,
    source: &TarSource,
) -> Result<()> {
    prepare_target(target)?;

    let extraction_failed = |e| Error::ExtractionFailed {
        path: target.to_path_buf(),
        source: e,
    };

    let mut file = fs::File::create(target).map_err(extraction_failed)?;
    let mut buffer = vec![0u8; COPY_BUFFER_BYTES];
    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(source.corrupted(e)),
        };
        file.write_all(&buffer[..n]).map_err(extraction_failed)?;
    }
    file.flush().map_err(extraction_failed)?;

    apply_mode(target, mode)?;
    trace!(file = %target.display(), "member written");
    Ok(())
}

/// Create missing parents and clear a previous non-directory entry at `target`.
///
/// Archives may repeat a path; the last occurrence wins.
fn prepare_target(target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| Error::DirectoryCreationFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    if let Ok(metadata) = fs::symlink_metadata(target) {
        if !metadata.is_dir() {
            fs::remove_file(target).map_err(|e| Error::ExtractionFailed {
                path: target.to_path_buf(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Create `path` as a real directory, replacing a file or link already there.
fn ensure_directory(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => return Ok(()),
        Ok(_) => fs::remove_file(path).map_err(|e| Error::ExtractionFailed {
            path: path.to_path_buf(),
            source: e,
        })?,
        Err(_) => {}
    }
    fs::create_dir_all(path).map_err(|e| Error::DirectoryCreationFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Mode for an extracted regular file: no special bits, owner can read and write.
pub(crate) fn file_mode(mode: Option<u32>) -> u32 {
    match mode {
        Some(m) => {
            let m = m & 0o777;
            if m & 0o111 != 0 { m | 0o600 } else { m | 0o644 }
        }
        None => 0o644,
    }
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(file_mode(mode))).map_err(|e| {
        Error::ExtractionFailed {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: Option<u32>) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn write_symlink(target: &Path, link: &Path, _resolved: Option<&Path>) -> Result<()> {
    std::os::unix::fs::symlink(target, link).map_err(|e| Error::LinkCreationFailed {
        target: target.to_path_buf(),
        link: link.to_path_buf(),
        source: e,
    })
}

#[cfg(windows)]
fn write_symlink(target: &Path, link: &Path, resolved: Option<&Path>) -> Result<()> {
    use std::os::windows::fs;
    let is_dir_target = resolved.is_some_and(Path::is_dir)
        || target.to_string_lossy().ends_with('/');
    let created = if is_dir_target {
        fs::symlink_dir(target, link)
    } else {
        fs::symlink_file(target, link)
    };
    created.map_err(|e| Error::LinkCreationFailed {
        target: target.to_path_buf(),
        link: link.to_path_buf(),
        source: e,
    })
}
