use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;
use walkdir::WalkDir;

use crate::categorize::{Category, categorize};
use crate::error::{Error, Result};
use crate::identifier::ArxivId;

/// Inventory of one extracted source tree.
///
/// Every regular file under `root` appears exactly once: as the main document
/// or in one of the five sorted lists. Paths are relative to `root`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceManifest {
    id: ArxivId,
    main_document: PathBuf,
    root: PathBuf,
    auxiliary_documents: Vec<PathBuf>,
    bibliography: Vec<PathBuf>,
    figures: Vec<PathBuf>,
    styles: Vec<PathBuf>,
    other: Vec<PathBuf>,
}

impl SourceManifest {
    pub fn id(&self) -> &ArxivId {
        &self.id
    }

    pub fn main_document(&self) -> &Path {
        &self.main_document
    }

    /// Absolute extraction root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn auxiliary_documents(&self) -> &[PathBuf] {
        &self.auxiliary_documents
    }

    pub fn bibliography(&self) -> &[PathBuf] {
        &self.bibliography
    }

    pub fn figures(&self) -> &[PathBuf] {
        &self.figures
    }

    pub fn styles(&self) -> &[PathBuf] {
        &self.styles
    }

    pub fn other(&self) -> &[PathBuf] {
        &self.other
    }

    /// Files listed under `category`. `Main` yields the main document alone.
    pub fn files(&self, category: Category) -> &[PathBuf] {
        match category {
            Category::Main => std::slice::from_ref(&self.main_document),
            Category::AuxiliaryDocument => &self.auxiliary_documents,
            Category::Bibliography => &self.bibliography,
            Category::Figure => &self.figures,
            Category::Style => &self.styles,
            Category::Other => &self.other,
        }
    }

    /// Category a relative path was filed under, if it is in the manifest.
    pub fn category_of(&self, path: &Path) -> Option<Category> {
        if path == self.main_document {
            return Some(Category::Main);
        }
        Category::LISTED.into_iter().find(|&category| {
            self.files(category)
                .binary_search_by(|p| p.as_path().cmp(path))
                .is_ok()
        })
    }

    /// Number of regular files, main document included.
    pub fn file_count(&self) -> usize {
        1 + Category::LISTED
            .into_iter()
            .map(|category| self.files(category).len())
            .sum::<usize>()
    }

    /// Absolute path of the main document.
    pub fn main_document_path(&self) -> PathBuf {
        self.root.join(&self.main_document)
    }

    pub(crate) fn log_summary(&self) {
        info!(
            id = %self.id,
            main = %self.main_document.display(),
            auxiliary = self.auxiliary_documents.len(),
            bibliography = self.bibliography.len(),
            figures = self.figures.len(),
            styles = self.styles.len(),
            other = self.other.len(),
            "source manifest assembled"
        );
    }
}

/// Walk `root` and file every regular file under exactly one category.
///
/// `main` is relative to `root` and must be one of the enumerated files.
pub fn assemble_manifest(id: ArxivId, root: &Path, main: PathBuf) -> Result<SourceManifest> {
    let mut manifest = SourceManifest {
        id,
        main_document: main,
        root: root.to_path_buf(),
        auxiliary_documents: Vec::new(),
        bibliography: Vec::new(),
        figures: Vec::new(),
        styles: Vec::new(),
        other: Vec::new(),
    };
    let mut saw_main = false;

    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| Error::WalkFailed {
            path: e.path().unwrap_or(root).to_path_buf(),
            source: e,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let relative = relative.to_path_buf();

        match categorize(&relative, &manifest.main_document) {
            Category::Main => saw_main = true,
            Category::AuxiliaryDocument => manifest.auxiliary_documents.push(relative),
            Category::Bibliography => manifest.bibliography.push(relative),
            Category::Figure => manifest.figures.push(relative),
            Category::Style => manifest.styles.push(relative),
            Category::Other => manifest.other.push(relative),
        }
    }

    if !saw_main {
        return Err(Error::MainDocumentNotFound {
            root: root.to_path_buf(),
        });
    }

    for list in [
        &mut manifest.auxiliary_documents,
        &mut manifest.bibliography,
        &mut manifest.figures,
        &mut manifest.styles,
        &mut manifest.other,
    ] {
        list.sort();
    }

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn id() -> ArxivId {
        ArxivId::from_archive_path("2411.00148.tar.gz").unwrap()
    }

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, relative).unwrap();
    }

    #[test]
    fn files_are_partitioned_by_category() {
        let dir = tempfile::tempdir().unwrap();
        for file in [
            "paper.tex",
            "refs.bib",
            "fig1.png",
            "macros.sty",
            "sections/intro.tex",
            "README",
        ] {
            touch(dir.path(), file);
        }

        let manifest = assemble_manifest(id(), dir.path(), PathBuf::from("paper.tex")).unwrap();

        assert_eq!(manifest.main_document(), Path::new("paper.tex"));
        assert_eq!(manifest.bibliography(), [PathBuf::from("refs.bib")]);
        assert_eq!(manifest.figures(), [PathBuf::from("fig1.png")]);
        assert_eq!(manifest.styles(), [PathBuf::from("macros.sty")]);
        assert_eq!(
            manifest.auxiliary_documents(),
            [PathBuf::from("sections/intro.tex")]
        );
        assert_eq!(manifest.other(), [PathBuf::from("README")]);
        assert_eq!(manifest.file_count(), 6);
        assert_eq!(manifest.main_document_path(), dir.path().join("paper.tex"));
    }

    #[test]
    fn lists_are_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for file in ["ms.tex", "z.png", "figs/b.png", "a.png", "figs/a.eps"] {
            touch(dir.path(), file);
        }

        let manifest = assemble_manifest(id(), dir.path(), PathBuf::from("ms.tex")).unwrap();
        let figures: Vec<&str> = manifest
            .figures()
            .iter()
            .map(|p| p.to_str().unwrap())
            .collect();
        assert_eq!(figures, ["a.png", "figs/a.eps", "figs/b.png", "z.png"]);
    }

    #[test]
    fn category_lookup() {
        let dir = tempfile::tempdir().unwrap();
        for file in ["paper.tex", "refs.bib", "appendix.tex"] {
            touch(dir.path(), file);
        }
        let manifest = assemble_manifest(id(), dir.path(), PathBuf::from("paper.tex")).unwrap();

        assert_eq!(manifest.category_of(Path::new("paper.tex")), Some(Category::Main));
        assert_eq!(
            manifest.category_of(Path::new("appendix.tex")),
            Some(Category::AuxiliaryDocument)
        );
        assert_eq!(
            manifest.category_of(Path::new("refs.bib")),
            Some(Category::Bibliography)
        );
        assert_eq!(manifest.category_of(Path::new("missing.png")), None);
        assert_eq!(manifest.files(Category::Main), [PathBuf::from("paper.tex")]);
    }

    #[test]
    fn missing_main_document_fails() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "refs.bib");

        let result = assemble_manifest(id(), dir.path(), PathBuf::from("paper.tex"));
        assert!(matches!(result, Err(Error::MainDocumentNotFound { .. })));
    }

    #[test]
    fn directories_are_not_listed() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "paper.tex");
        fs::create_dir_all(dir.path().join("empty/nested")).unwrap();

        let manifest = assemble_manifest(id(), dir.path(), PathBuf::from("paper.tex")).unwrap();
        assert_eq!(manifest.file_count(), 1);
        assert!(manifest.other().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_not_listed() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "paper.tex");
        touch(dir.path(), "figs/v2.png");
        std::os::unix::fs::symlink("v2.png", dir.path().join("figs/current.png")).unwrap();

        let manifest = assemble_manifest(id(), dir.path(), PathBuf::from("paper.tex")).unwrap();
        assert_eq!(manifest.figures(), [PathBuf::from("figs/v2.png")]);
    }

    #[test]
    fn serializes_to_json() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "paper.tex");
        touch(dir.path(), "refs.bib");
        let manifest = assemble_manifest(id(), dir.path(), PathBuf::from("paper.tex")).unwrap();

        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["id"], "2411.00148");
        assert_eq!(json["main_document"], "paper.tex");
        assert_eq!(json["bibliography"][0], "refs.bib");
        assert_eq!(json["figures"].as_array().unwrap().len(), 0);
    }
}
