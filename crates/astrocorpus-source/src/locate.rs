//! Main-document detection.
//!
//! Candidates are gathered and sorted before any file is opened, so the
//! chosen document never depends on directory enumeration order.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Extension of LaTeX document sources, compared case-insensitively.
pub const DOCUMENT_EXTENSION: &str = "tex";

/// Bytes read at a time from a single line.
const MAX_LINE_BYTES: u64 = 64 * 1024;

/// Find the first `.tex` file, in path order, whose first `scan_lines` lines
/// contain `marker`. Returns a path relative to `root`.
pub fn find_main_document(root: &Path, marker: &str, scan_lines: usize) -> Result<PathBuf> {
    let candidates = document_candidates(root);
    debug!(
        root = %root.display(),
        candidates = candidates.len(),
        "scanning for main document"
    );

    for relative in candidates {
        let path = root.join(&relative);
        match has_marker(&path, marker, scan_lines) {
            Ok(true) => {
                debug!(main = %relative.display(), "main document found");
                return Ok(relative);
            }
            Ok(false) => trace!(file = %relative.display(), "no marker"),
            Err(e) => warn!(
                file = %path.display(),
                error = %e,
                "skipping unreadable document candidate"
            ),
        }
    }

    Err(Error::MainDocumentNotFound {
        root: root.to_path_buf(),
    })
}

/// Every regular `.tex` file under `root`, relative and sorted by `Path` order.
///
/// Symlinks are neither followed nor returned.
pub fn document_candidates(root: &Path) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(root = %root.display(), error = %e, "skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_document_source(entry.path()))
        .filter_map(|entry| entry.path().strip_prefix(root).ok().map(Path::to_path_buf))
        .collect();

    candidates.sort();
    candidates
}

pub fn is_document_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
}

/// Whether any of the first `scan_lines` lines of `path` contains `marker`.
///
/// Lines longer than [`MAX_LINE_BYTES`] are searched in chunks that overlap by
/// `marker.len() - 1` bytes, so a marker spanning a chunk boundary is found
/// without holding the whole line in memory.
fn has_marker(path: &Path, marker: &str, scan_lines: usize) -> std::io::Result<bool> {
    let mut reader = BufReader::new(File::open(path)?);
    let overlap = marker.len().saturating_sub(1);
    let mut chunk = Vec::new();
    let mut lines = 0;

    while lines < scan_lines {
        let read = (&mut reader).take(MAX_LINE_BYTES).read_until(b'\n', &mut chunk)?;
        if read == 0 {
            break;
        }
        if String::from_utf8_lossy(&chunk).contains(marker) {
            return Ok(true);
        }

        if chunk.last() == Some(&b'\n') {
            lines += 1;
            chunk.clear();
        } else if (read as u64) < MAX_LINE_BYTES {
            break;
        } else {
            let keep = overlap.min(chunk.len());
            chunk.drain(..chunk.len() - keep);
        }
    }

    Ok(false)
}
