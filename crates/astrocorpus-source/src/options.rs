use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::ErrorKind;

/// Marker that identifies the top-level LaTeX document.
pub const DEFAULT_MARKER: &str = "\\documentclass";

/// Number of leading lines inspected per candidate file.
pub const DEFAULT_SCAN_LINES: usize = 10;

#[derive(Clone)]
pub struct ExtractOptions {
    pub marker: String,
    pub scan_lines: usize,
    pub existing_root: ExistingRoot,
    pub on_progress: Option<Arc<dyn Fn(Progress) + Send + Sync>>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            scan_lines: DEFAULT_SCAN_LINES,
            existing_root: ExistingRoot::default(),
            on_progress: None,
        }
    }
}

impl fmt::Debug for ExtractOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractOptions")
            .field("marker", &self.marker)
            .field("scan_lines", &self.scan_lines)
            .field("existing_root", &self.existing_root)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl ExtractOptions {
    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn scan_lines(mut self, lines: usize) -> Self {
        self.scan_lines = lines;
        self
    }

    pub fn existing_root(mut self, policy: ExistingRoot) -> Self {
        self.existing_root = policy;
        self
    }

    pub fn on_progress(mut self, callback: Arc<dyn Fn(Progress) + Send + Sync>) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub(crate) fn report(&self, progress: Progress) {
        if let Some(ref callback) = self.on_progress {
            callback(progress);
        }
    }
}

/// What to do when `{destination}/{identifier}` already exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ExistingRoot {
    /// Swap the previous tree out for the new extraction.
    #[default]
    Replace,
    /// Fail before anything is written.
    Fail,
}

/// Extraction stages, in the order they are entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Pending,
    Validated,
    Extracted,
    MainDocumentLocated,
    Categorized,
    Complete,
    Failed(ErrorKind),
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed(_))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Validated => write!(f, "validated"),
            Self::Extracted => write!(f, "extracted"),
            Self::MainDocumentLocated => write!(f, "main-document-located"),
            Self::Categorized => write!(f, "categorized"),
            Self::Complete => write!(f, "complete"),
            Self::Failed(kind) => write!(f, "failed({kind:?})"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Progress {
    pub stage: Stage,
    pub members_processed: usize,
    pub total_members: Option<usize>,
    pub bytes_processed: u64,
    pub current_file: Option<PathBuf>,
}

impl Progress {
    pub fn stage(stage: Stage) -> Self {
        Self {
            stage,
            members_processed: 0,
            total_members: None,
            bytes_processed: 0,
            current_file: None,
        }
    }

    pub fn percentage(&self) -> Option<f32> {
        self.total_members.map(|total| {
            if total == 0 {
                100.0
            } else {
                (self.members_processed as f32 / total as f32) * 100.0
            }
        })
    }
}
