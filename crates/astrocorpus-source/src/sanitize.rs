//! Member validation against the extraction root.
//!
//! Everything here is lexical: paths are joined and normalized without
//! touching the filesystem, so a whole archive can be checked before the
//! first byte is written.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::entry::{ArchiveMember, ExtractionPlan, MemberKind, ValidatedMember};
use crate::error::{Error, Result};
use crate::identifier::ArxivId;

/// `{destination}/{identifier}` as an absolute, normalized path.
pub fn extraction_root(destination: impl AsRef<Path>, id: &ArxivId) -> Result<PathBuf> {
    let destination = destination.as_ref();
    let absolute = std::path::absolute(destination).map_err(|e| Error::ExtractionFailed {
        path: destination.to_path_buf(),
        source: e,
    })?;
    Ok(normalize_path(&absolute.join(id.relative_dir())))
}

/// Validate every member against `root`. Fails on the first violation.
pub fn validate_members(members: Vec<ArchiveMember>, root: &Path) -> Result<ExtractionPlan> {
    let root = normalize_path(root);

    let mut destinations = Vec::with_capacity(members.len());
    for member in &members {
        let destination = sanitize_member_path(&member.path, &root)?;
        if destination == root && !member.is_directory() {
            return Err(Error::InvalidPath {
                entry: member.path.clone(),
                reason: "only directories may resolve to the extraction root",
            });
        }
        destinations.push(destination);
    }

    let symlinks: HashMap<PathBuf, PathBuf> = members
        .iter()
        .zip(&destinations)
        .filter(|(member, _)| member.is_symlink())
        .map(|(member, destination)| (destination.clone(), member.path.clone()))
        .collect();

    let mut validated = Vec::with_capacity(members.len());
    for (member, destination) in members.into_iter().zip(destinations) {
        if let Some(link) = symlink_ancestor(&destination, &root, &symlinks) {
            return Err(Error::LinkTraversal {
                entry: member.path,
                link: link.to_path_buf(),
            });
        }

        let resolved_target = match &member.kind {
            MemberKind::Symlink { target } => Some(sanitize_symlink_target(
                &member.path,
                target,
                &destination,
                &root,
                &symlinks,
            )?),
            MemberKind::Hardlink { target } => Some(sanitize_hardlink_target(
                &member.path,
                target,
                &root,
                &symlinks,
            )?),
            _ => None,
        };

        validated.push(ValidatedMember {
            member,
            destination,
            resolved_target,
        });
    }

    debug!(
        members = validated.len(),
        root = %root.display(),
        "archive members validated"
    );

    Ok(ExtractionPlan {
        root,
        members: validated,
    })
}

/// Resolve a member path under `root`.
///
/// Absolute paths are refused outright rather than re-rooted.
pub fn sanitize_member_path(entry: &Path, root: &Path) -> Result<PathBuf> {
    if is_rooted(entry) {
        return Err(Error::AbsolutePath {
            entry: entry.to_path_buf(),
        });
    }

    let resolved = normalize_path(&root.join(entry));
    if !resolved.starts_with(root) {
        return Err(Error::PathTraversal {
            entry: entry.to_path_buf(),
            resolved,
        });
    }

    Ok(resolved)
}

/// Resolve a symlink target relative to the directory holding the link.
pub fn sanitize_symlink_target(
    entry: &Path,
    target: &Path,
    link_destination: &Path,
    root: &Path,
    symlinks: &HashMap<PathBuf, PathBuf>,
) -> Result<PathBuf> {
    if is_rooted(target) {
        return Err(Error::AbsoluteSymlinkTarget {
            entry: entry.to_path_buf(),
            target: target.to_path_buf(),
        });
    }
    if target.as_os_str().is_empty() {
        return Err(Error::InvalidPath {
            entry: entry.to_path_buf(),
            reason: "symlink target is empty",
        });
    }

    let mut resolved = link_destination
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());

    for (i, component) in target.components().enumerate() {
        // A later component would be applied to whatever that link points at.
        if i > 0 {
            if let Some(link) = symlinks.get(&resolved) {
                return Err(Error::LinkTraversal {
                    entry: entry.to_path_buf(),
                    link: link.clone(),
                });
            }
        }
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => {
                return Err(Error::AbsoluteSymlinkTarget {
                    entry: entry.to_path_buf(),
                    target: target.to_path_buf(),
                });
            }
        }
    }

    if !resolved.starts_with(root) {
        return Err(Error::SymlinkEscape {
            entry: entry.to_path_buf(),
            target: target.to_path_buf(),
            resolved,
        });
    }

    Ok(resolved)
}

/// Resolve a hardlink target, which tar records relative to the archive root.
pub fn sanitize_hardlink_target(
    entry: &Path,
    target: &Path,
    root: &Path,
    symlinks: &HashMap<PathBuf, PathBuf>,
) -> Result<PathBuf> {
    let escape = |resolved: PathBuf| Error::HardlinkEscape {
        entry: entry.to_path_buf(),
        target: target.to_path_buf(),
        resolved,
    };

    if is_rooted(target) {
        return Err(escape(target.to_path_buf()));
    }

    let resolved = normalize_path(&root.join(target));
    if !resolved.starts_with(root) || resolved == root {
        return Err(escape(resolved));
    }
    // Linking to a symlink copies the link itself, re-rooting its target text.
    if let Some(link) = symlinks
        .get(&resolved)
        .map(PathBuf::as_path)
        .or_else(|| symlink_ancestor(&resolved, root, symlinks))
    {
        return Err(Error::LinkTraversal {
            entry: entry.to_path_buf(),
            link: link.to_path_buf(),
        });
    }

    Ok(resolved)
}

/// First proper ancestor of `path` (below `root`) that is an archive symlink.
fn symlink_ancestor<'a>(
    path: &Path,
    root: &Path,
    symlinks: &'a HashMap<PathBuf, PathBuf>,
) -> Option<&'a Path> {
    path.ancestors()
        .skip(1)
        .take_while(|ancestor| *ancestor != root && ancestor.starts_with(root))
        .find_map(|ancestor| symlinks.get(ancestor))
        .map(PathBuf::as_path)
}

fn is_rooted(path: &Path) -> bool {
    path.has_root()
        || path
            .components()
            .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
}

/// Resolve `.` and `..` lexically and drop redundant separators.
///
/// `..` never climbs above a root component.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::Normal(part) => result.push(part),
            Component::RootDir => result.push(component.as_os_str()),
            Component::Prefix(prefix) => result.push(prefix.as_os_str()),
            Component::CurDir => {}
        }
    }

    result
}
