//! Archive fixtures shared by unit and integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tar::{EntryType, Header};

struct RawEntry {
    path: String,
    kind: EntryType,
    data: Vec<u8>,
    mode: u32,
    link: Option<String>,
}

/// Builds `.tar.gz` fixtures with raw header names, so hostile paths that
/// `tar::Builder::append_path` would refuse can still be written.
#[derive(Default)]
pub(crate) struct ArchiveBuilder {
    entries: Vec<RawEntry>,
}

impl ArchiveBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push(
        mut self,
        path: &str,
        kind: EntryType,
        data: &[u8],
        mode: u32,
        link: Option<&str>,
    ) -> Self {
        self.entries.push(RawEntry {
            path: path.to_string(),
            kind,
            data: data.to_vec(),
            mode,
            link: link.map(str::to_string),
        });
        self
    }

    pub(crate) fn dir(self, path: &str) -> Self {
        self.push(path, EntryType::Directory, b"", 0o755, None)
    }

    pub(crate) fn file(self, path: &str, contents: impl AsRef<[u8]>) -> Self {
        self.push(path, EntryType::Regular, contents.as_ref(), 0o644, None)
    }

    pub(crate) fn file_with_mode(self, path: &str, contents: impl AsRef<[u8]>, mode: u32) -> Self {
        self.push(path, EntryType::Regular, contents.as_ref(), mode, None)
    }

    pub(crate) fn symlink(self, path: &str, target: &str) -> Self {
        self.push(path, EntryType::Symlink, b"", 0o777, Some(target))
    }

    pub(crate) fn hardlink(self, path: &str, target: &str) -> Self {
        self.push(path, EntryType::Link, b"", 0o644, Some(target))
    }

    pub(crate) fn fifo(self, path: &str) -> Self {
        self.push(path, EntryType::Fifo, b"", 0o644, None)
    }

    pub(crate) fn tar_bytes(&self) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for entry in &self.entries {
            let mut header = Header::new_gnu();
            let name = entry.path.as_bytes();
            assert!(name.len() < 100, "fixture path too long: {}", entry.path);
            header.as_old_mut().name[..name.len()].copy_from_slice(name);
            if let Some(link) = &entry.link {
                let link = link.as_bytes();
                header.as_old_mut().linkname[..link.len()].copy_from_slice(link);
            }
            header.set_entry_type(entry.kind);
            header.set_size(entry.data.len() as u64);
            header.set_mode(entry.mode);
            header.set_mtime(0);
            header.set_cksum();
            builder.append(&header, entry.data.as_slice()).unwrap();
        }
        builder.into_inner().unwrap()
    }

    pub(crate) fn gz_bytes(&self) -> Vec<u8> {
        use std::io::Write;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&self.tar_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    pub(crate) fn write_to(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        std::fs::write(&path, self.gz_bytes()).unwrap();
        path
    }
}
