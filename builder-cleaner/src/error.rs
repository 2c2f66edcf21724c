//! Error types for builder-cleaner.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by a [`NamespaceSource`](crate::NamespaceSource).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ListError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl ListError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// All errors that can arise from a cleaner cycle.
#[derive(Debug, Error)]
pub enum CleanerError {
    /// The namespace source was unreachable or returned an error.
    #[error("error listing namespaces: {0}")]
    List(#[from] ListError),

    /// The git home could not be enumerated.
    #[error("error listing local git directories in {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single orphaned directory could not be removed.
    #[error("error removing deleted app {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CleanerError {
    /// Short operation label used as a structured log field.
    pub fn operation(&self) -> &'static str {
        match self {
            CleanerError::List(_) => "list",
            CleanerError::Scan { .. } => "scan",
            CleanerError::Delete { .. } => "delete",
        }
    }
}

pub(crate) fn scan_err(path: impl Into<PathBuf>, source: std::io::Error) -> CleanerError {
    CleanerError::Scan {
        path: path.into(),
        source,
    }
}

pub(crate) fn delete_err(path: impl Into<PathBuf>, source: std::io::Error) -> CleanerError {
    CleanerError::Delete {
        path: path.into(),
        source,
    }
}
