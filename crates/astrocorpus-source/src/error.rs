use std::io;
use std::path::PathBuf;

/// Failure classes callers branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed stream, bad file name, or a member escaping the extraction root.
    InvalidArchive,
    /// Extraction succeeded but no file carries the top-level marker.
    MainDocumentNotFound,
    /// Filesystem failure while reading the archive or writing the tree.
    ExtractionFailed,
    /// An error that reached the caller without passing a classified path.
    Unclassified,
}

impl ErrorKind {
    /// Whether repeating the call unchanged could succeed.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::ExtractionFailed | Self::Unclassified)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot derive an arXiv identifier from '{path}': {reason}")]
    InvalidIdentifier { path: PathBuf, reason: &'static str },

    #[error("'{path}' is not a gzip-compressed archive")]
    NotGzip { path: PathBuf },

    #[error("archive '{path}' is corrupted: {source}")]
    Corrupted { path: PathBuf, source: io::Error },

    #[error("path traversal detected: entry '{entry}' resolves to '{resolved}'")]
    PathTraversal { entry: PathBuf, resolved: PathBuf },

    #[error("entry '{entry}' has an absolute path")]
    AbsolutePath { entry: PathBuf },

    #[error("entry '{entry}' is not a valid member path: {reason}")]
    InvalidPath { entry: PathBuf, reason: &'static str },

    #[error("symlink '{entry}' -> '{target}' escapes the extraction root (resolves to '{resolved}')")]
    SymlinkEscape {
        entry: PathBuf,
        target: PathBuf,
        resolved: PathBuf,
    },

    #[error("symlink '{entry}' has absolute target '{target}'")]
    AbsoluteSymlinkTarget { entry: PathBuf, target: PathBuf },

    #[error("hardlink '{entry}' -> '{target}' escapes the extraction root (resolves to '{resolved}')")]
    HardlinkEscape {
        entry: PathBuf,
        target: PathBuf,
        resolved: PathBuf,
    },

    #[error("entry '{entry}' passes through archive symlink '{link}'")]
    LinkTraversal { entry: PathBuf, link: PathBuf },

    #[error("archive member sequence changed between validation and extraction at '{entry}'")]
    MemberMismatch { entry: PathBuf },

    #[error("failed to open archive '{path}': {source}")]
    ArchiveUnreadable { path: PathBuf, source: io::Error },

    #[error("failed to extract '{path}': {source}")]
    ExtractionFailed { path: PathBuf, source: io::Error },

    #[error("failed to create directory '{path}': {source}")]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    #[error("failed to create link '{link}' -> '{target}': {source}")]
    LinkCreationFailed {
        target: PathBuf,
        link: PathBuf,
        source: io::Error,
    },

    #[error("extraction root already exists: '{path}'")]
    RootExists { path: PathBuf },

    #[error("workspace operation failed: {source}")]
    WorkspaceFailed { source: astrocorpus_fs::Error },

    #[error("failed to enumerate '{path}': {source}")]
    WalkFailed {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("no .tex file containing the top-level marker found in '{root}'")]
    MainDocumentNotFound { root: PathBuf },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidIdentifier { .. }
            | Self::NotGzip { .. }
            | Self::Corrupted { .. }
            | Self::PathTraversal { .. }
            | Self::AbsolutePath { .. }
            | Self::InvalidPath { .. }
            | Self::SymlinkEscape { .. }
            | Self::AbsoluteSymlinkTarget { .. }
            | Self::HardlinkEscape { .. }
            | Self::LinkTraversal { .. }
            | Self::MemberMismatch { .. } => ErrorKind::InvalidArchive,
            Self::ArchiveUnreadable { .. }
            | Self::ExtractionFailed { .. }
            | Self::DirectoryCreationFailed { .. }
            | Self::LinkCreationFailed { .. }
            | Self::RootExists { .. }
            | Self::WorkspaceFailed { .. }
            | Self::WalkFailed { .. } => ErrorKind::ExtractionFailed,
            Self::MainDocumentNotFound { .. } => ErrorKind::MainDocumentNotFound,
            Self::Io(_) => ErrorKind::Unclassified,
        }
    }
}

impl From<astrocorpus_fs::Error> for Error {
    fn from(e: astrocorpus_fs::Error) -> Self {
        match e {
            astrocorpus_fs::Error::AlreadyExists { path } => Self::RootExists { path },
            other => Self::WorkspaceFailed { source: other },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
