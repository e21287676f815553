use std::path::Path;

use serde::Serialize;

/// Role of an extracted file within a LaTeX source tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// The top-level document. Never listed alongside the others.
    Main,
    AuxiliaryDocument,
    Bibliography,
    Figure,
    Style,
    Other,
}

impl Category {
    /// The categories a manifest lists, in manifest order.
    pub const LISTED: [Category; 5] = [
        Category::AuxiliaryDocument,
        Category::Bibliography,
        Category::Figure,
        Category::Style,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::AuxiliaryDocument => "auxiliary_document",
            Self::Bibliography => "bibliography",
            Self::Figure => "figure",
            Self::Style => "style",
            Self::Other => "other",
        }
    }
}

/// Categorize `path`; `main` is the already-located main document.
pub fn categorize(path: &Path, main: &Path) -> Category {
    if path == main {
        Category::Main
    } else {
        category_for_path(path)
    }
}

/// Extension-only categorization. Never returns [`Category::Main`].
pub fn category_for_path(path: &Path) -> Category {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return Category::Other;
    };

    match ext.to_ascii_lowercase().as_str() {
        "tex" => Category::AuxiliaryDocument,
        "bib" => Category::Bibliography,
        "png" | "jpg" | "jpeg" | "pdf" | "eps" | "epsf" | "ps" => Category::Figure,
        "sty" | "cls" => Category::Style,
        _ => Category::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(path: &str) -> Category {
        category_for_path(Path::new(path))
    }

    #[test]
    fn extension_table() {
        assert_eq!(cat("sections/intro.tex"), Category::AuxiliaryDocument);
        assert_eq!(cat("refs.bib"), Category::Bibliography);
        for figure in ["f.png", "f.jpg", "f.jpeg", "f.pdf", "f.eps", "f.epsf", "f.ps"] {
            assert_eq!(cat(figure), Category::Figure, "{figure}");
        }
        assert_eq!(cat("macros.sty"), Category::Style);
        assert_eq!(cat("aastex631.cls"), Category::Style);
    }

    #[test]
    fn extension_match_ignores_case() {
        assert_eq!(cat("FIG1.PNG"), Category::Figure);
        assert_eq!(cat("Refs.Bib"), Category::Bibliography);
    }

    #[test]
    fn everything_else_is_other() {
        assert_eq!(cat("README"), Category::Other);
        assert_eq!(cat(".latexmkrc"), Category::Other);
        assert_eq!(cat("paper.bbl"), Category::Other);
        assert_eq!(cat("data.tar.gz"), Category::Other);
        assert_eq!(cat("trailing."), Category::Other);
    }

    #[test]
    fn main_document_wins_over_extension() {
        let main = Path::new("paper.tex");
        assert_eq!(categorize(main, main), Category::Main);
        assert_eq!(
            categorize(Path::new("sub/paper.tex"), main),
            Category::AuxiliaryDocument
        );
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&Category::AuxiliaryDocument).unwrap();
        assert_eq!(json, "\"auxiliary_document\"");
        for category in Category::LISTED {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }
}
