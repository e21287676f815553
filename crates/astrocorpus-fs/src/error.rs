use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to replace directory '{path}': {source}")]
    ReplaceDir { path: PathBuf, source: io::Error },

    #[error("destination already exists: '{path}'")]
    AlreadyExists { path: PathBuf },

    #[error("failed to restore '{destination}' from backup '{path}': {source}")]
    RestoreFailed {
        path: PathBuf,
        destination: PathBuf,
        source: io::Error,
    },

    #[error("previous tree of '{destination}' left at '{path}': {source}")]
    BackupCleanup {
        path: PathBuf,
        destination: PathBuf,
        source: io::Error,
    },
}

impl Error {
    /// Path the failed operation was acting on.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Write { path, .. }
            | Self::ReplaceDir { path, .. }
            | Self::AlreadyExists { path }
            | Self::RestoreFailed { path, .. }
            | Self::BackupCleanup { path, .. } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
