use std::fs::File;
use std::io::{BufReader, Seek};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tar::EntryType;
use tracing::debug;

use crate::entry::{ArchiveMember, MemberKind};
use crate::error::{Error, Result};
use crate::format;

pub type GzTarArchive = tar::Archive<GzDecoder<BufReader<File>>>;

/// A gzip-compressed tar archive on disk.
///
/// Each call to [`TarSource::open`] starts a fresh pass over the stream, so
/// headers can be read for validation before anything is extracted.
#[derive(Clone, Debug)]
pub struct TarSource {
    path: PathBuf,
}

impl TarSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn open(&self) -> Result<GzTarArchive> {
        let mut file = File::open(&self.path).map_err(|e| Error::ArchiveUnreadable {
            path: self.path.clone(),
            source: e,
        })?;

        let is_gzip = format::detect_gzip(&mut file).map_err(|e| Error::ArchiveUnreadable {
            path: self.path.clone(),
            source: e,
        })?;
        if !is_gzip {
            return Err(Error::NotGzip {
                path: self.path.clone(),
            });
        }
        file.rewind().map_err(|e| Error::ArchiveUnreadable {
            path: self.path.clone(),
            source: e,
        })?;

        let mut archive = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
        archive.set_preserve_permissions(false);
        archive.set_preserve_mtime(false);
        archive.set_unpack_xattrs(false);
        Ok(archive)
    }

    pub(crate) fn corrupted(&self, source: std::io::Error) -> Error {
        Error::Corrupted {
            path: self.path.clone(),
            source,
        }
    }

    /// Read every member header without writing anything.
    pub fn members(&self) -> Result<Vec<ArchiveMember>> {
        let mut archive = self.open()?;
        let mut members = Vec::new();

        for entry in archive.entries().map_err(|e| self.corrupted(e))? {
            let entry = entry.map_err(|e| self.corrupted(e))?;
            members.push(member_from_entry(&entry).map_err(|e| self.corrupted(e))?);
        }

        debug!(
            archive = %self.path.display(),
            members = members.len(),
            "archive headers read"
        );
        Ok(members)
    }
}

/// Read every member header of the archive at `path`.
pub fn read_members(path: impl AsRef<Path>) -> Result<Vec<ArchiveMember>> {
    TarSource::new(path.as_ref()).members()
}

pub(crate) fn member_from_entry<R: std::io::Read>(
    entry: &tar::Entry<'_, R>,
) -> std::io::Result<ArchiveMember> {
    let path = entry.path()?.into_owned();
    let header = entry.header();
    let size = header.size()?;
    let mode = header.mode().ok();
    let entry_type = header.entry_type();

    let kind = match entry_type {
        EntryType::Regular | EntryType::Continuous => MemberKind::File,
        EntryType::Directory => MemberKind::Directory,
        EntryType::Symlink | EntryType::Link => {
            let target = entry
                .link_name()?
                .map(|t| t.into_owned())
                .ok_or_else(|| {
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("link '{}' has no target", path.display()),
                    )
                })?;
            if entry_type == EntryType::Symlink {
                MemberKind::Symlink { target }
            } else {
                MemberKind::Hardlink { target }
            }
        }
        other => MemberKind::Unsupported {
            type_flag: other.as_byte(),
        },
    };

    Ok(ArchiveMember {
        path,
        size,
        mode,
        kind,
    })
}
