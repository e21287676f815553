use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};

/// Archive suffixes stripped from the file name, longest first.
const ARCHIVE_SUFFIXES: &[&str] = &[".tar.gz", ".tgz", ".tar", ".gz"];

/// arXiv identifier recovered from a source archive file name.
///
/// Old-style identifiers contain a slash (`astro-ph/0601001`), which upstream
/// stores as an underscore (`astro-ph_0601001.tar.gz`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ArxivId(String);

impl ArxivId {
    pub fn from_archive_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let invalid = |reason| Error::InvalidIdentifier {
            path: path.to_path_buf(),
            reason,
        };

        let file_name = path
            .file_name()
            .ok_or_else(|| invalid("path has no file name"))?
            .to_str()
            .ok_or_else(|| invalid("file name is not valid UTF-8"))?;

        let stem = strip_archive_suffix(file_name);
        Self::parse(&stem.replace('_', "/")).map_err(invalid)
    }

    fn parse(id: &str) -> std::result::Result<Self, &'static str> {
        if id.is_empty() {
            return Err("identifier is empty");
        }
        for segment in id.split('/') {
            match segment {
                "" => return Err("identifier has an empty segment"),
                "." | ".." => return Err("identifier has a relative segment"),
                s if s.contains('\\') || s.contains('\0') => {
                    return Err("identifier has a reserved character");
                }
                _ => {}
            }
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory under the destination root, one level per `/` segment.
    pub fn relative_dir(&self) -> PathBuf {
        self.0.split('/').collect()
    }

    /// File name upstream uses when storing this identifier's archive.
    pub fn archive_file_name(&self) -> String {
        format!("{}.tar.gz", self.0.replace('/', "_"))
    }
}

impl fmt::Display for ArxivId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArxivId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn strip_archive_suffix(file_name: &str) -> &str {
    for suffix in ARCHIVE_SUFFIXES {
        let split = file_name.len().saturating_sub(suffix.len());
        if file_name.is_char_boundary(split) && file_name[split..].eq_ignore_ascii_case(suffix) {
            return &file_name[..split];
        }
    }
    file_name
}
