//! Safe extraction of arXiv LaTeX source archives.
//!
//! One call turns `{identifier}.tar.gz` into an extracted tree under
//! `{destination}/{identifier}` and a [`SourceManifest`] naming the main
//! document and every other file by role.
//!
//! - `identifier.rs` - arXiv identifier from the archive file name
//! - `sanitize.rs` - Containment checks for member paths and link targets
//! - `extract/` - Header pass and staged write pass over the gzip tar stream
//! - `locate.rs` - Main-document detection by marker
//! - `categorize.rs` - Extension-based file roles
//! - `manifest.rs` - Manifest assembly
//! - `pipeline.rs` - Stage sequencing and progress reporting
//!
//! ```no_run
//! use astrocorpus_source::{ExtractOptions, extract_source};
//!
//! let options = ExtractOptions::default();
//! let manifest = extract_source("2411.00148.tar.gz", "/data/sources", &options)?;
//! println!("{} -> {}", manifest.id(), manifest.main_document().display());
//! # Ok::<(), astrocorpus_source::Error>(())
//! ```

pub mod categorize;
pub mod entry;
pub mod error;
pub mod extract;
pub mod format;
pub mod identifier;
pub mod locate;
pub mod manifest;
pub mod options;
pub mod pipeline;
pub mod sanitize;
mod workspace;

#[cfg(feature = "subscriber")]
pub mod logging;

#[cfg(test)]
#[path = "../tests/common/mod.rs"]
mod test_support;

pub use categorize::{Category, categorize};
pub use entry::{ArchiveMember, ExtractionPlan, MemberKind, ValidatedMember};
pub use error::{Error, ErrorKind, Result};
pub use extract::{TarSource, extract_plan, read_members};
pub use identifier::ArxivId;
pub use locate::find_main_document;
pub use manifest::{SourceManifest, assemble_manifest};
pub use options::{
    DEFAULT_MARKER, DEFAULT_SCAN_LINES, ExistingRoot, ExtractOptions, Progress, Stage,
};
pub use pipeline::extract_source;
pub use sanitize::{extraction_root, validate_members};

#[cfg(feature = "subscriber")]
pub use logging::init_logging;
