//! Pipeline - the end-to-end extraction of one source archive.
//!
//! Stages run strictly in order. A failure in any stage is reported as
//! `Stage::Failed` and returned; no partial manifest is ever produced.

use std::path::Path;

use tracing::{debug, info_span, warn};

use crate::error::Result;
use crate::extract::{TarSource, extract_plan};
use crate::identifier::ArxivId;
use crate::locate::find_main_document;
use crate::manifest::{SourceManifest, assemble_manifest};
use crate::options::{ExtractOptions, Progress, Stage};
use crate::sanitize::{extraction_root, validate_members};

/// Extract `archive` into `{destination}/{identifier}` and inventory it.
///
/// Validation covers every member before anything is written. On success the
/// extracted tree is left in place for the caller.
pub fn extract_source(
    archive: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<SourceManifest> {
    let archive = archive.as_ref();
    let span = info_span!("extract_source", archive = %archive.display());
    let _guard = span.enter();

    let mut stage = Stage::Pending;
    options.report(Progress::stage(stage));

    let result = run_stages(archive, destination.as_ref(), options, &mut stage);
    if let Err(e) = &result {
        let failed = Stage::Failed(e.kind());
        warn!(
            stage = %stage,
            kind = ?e.kind(),
            error = %e,
            "source extraction failed"
        );
        options.report(Progress::stage(failed));
    }
    result
}

fn run_stages(
    archive: &Path,
    destination: &Path,
    options: &ExtractOptions,
    stage: &mut Stage,
) -> Result<SourceManifest> {
    let id = ArxivId::from_archive_path(archive)?;
    let root = extraction_root(destination, &id)?;

    let source = TarSource::new(archive);
    let plan = validate_members(source.members()?, &root)?;
    advance(stage, Stage::Validated, options);

    let root = extract_plan(&source, &plan, options)?;
    advance(stage, Stage::Extracted, options);

    let main = find_main_document(&root, &options.marker, options.scan_lines)?;
    advance(stage, Stage::MainDocumentLocated, options);

    let manifest = assemble_manifest(id, &root, main)?;
    advance(stage, Stage::Categorized, options);

    manifest.log_summary();
    advance(stage, Stage::Complete, options);
    Ok(manifest)
}

fn advance(stage: &mut Stage, next: Stage, options: &ExtractOptions) {
    debug!(from = %stage, to = %next, "stage transition");
    *stage = next;
    options.report(Progress::stage(next));
}
