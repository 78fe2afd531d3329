//! Core error types.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while reading automaton and interval artifacts.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An artifact exists but its content does not follow the expected layout.
    #[error("malformed artifact {}: {reason}", path.display())]
    MalformedArtifact {
        /// The offending artifact.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// An artifact could not be opened or read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// The artifact being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

impl CoreError {
    pub(crate) fn malformed(path: &Path, reason: impl Into<String>) -> Self {
        Self::MalformedArtifact {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
