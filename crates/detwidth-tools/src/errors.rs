//! Tool error types.
//!
//! These cover failures to *launch* a collaborator. A collaborator that runs
//! and exits non-zero is not a `ToolError`; the caller sees the exit code in
//! [`crate::ProcessOutcome`] and decides.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while invoking an external collaborator.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The process could not be started or awaited.
    #[error("failed to run {}: {source}", program.display())]
    Spawn {
        /// The executable.
        program: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A stdin/stdout redirection target could not be opened.
    #[error("cannot redirect through {}: {source}", path.display())]
    Redirect {
        /// The file being redirected from or to.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The run log could not be opened or written.
    #[error("cannot write log file {}: {source}", path.display())]
    Log {
        /// The log file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}
