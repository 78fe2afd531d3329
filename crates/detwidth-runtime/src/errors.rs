//! Runtime error types.
//!
//! Every variant is fatal to the current run; nothing is retried.

use std::io;
use std::path::PathBuf;

use detwidth_core::CoreError;
use detwidth_tools::{Invocation, Stage, ToolError};
use thiserror::Error;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Bad arguments, rejected before any stage runs.
    #[error("{0}")]
    Validation(String),

    /// An artifact could not be read or did not parse.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A collaborator could not be launched.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// A collaborator exited non-zero.
    #[error("{stage} failed with exit code {exit_code}: {command} (check log file: {})", log_path.display())]
    Invocation {
        /// The failing stage.
        stage: Stage,
        /// The exact command line.
        command: String,
        /// Its exit code.
        exit_code: i32,
        /// Where its output went.
        log_path: PathBuf,
    },

    /// Filesystem work of the orchestrator itself failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The path involved.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// Writing the user-facing report failed.
    #[error("cannot write output: {0}")]
    Output(#[source] io::Error),
}

impl RuntimeError {
    /// Build the non-zero-exit error for `invocation`.
    pub fn invocation(invocation: &Invocation, exit_code: i32, log_path: impl Into<PathBuf>) -> Self {
        Self::Invocation {
            stage: invocation.stage,
            command: invocation.command_line(),
            exit_code,
            log_path: log_path.into(),
        }
    }

    /// Short classification string for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Core(CoreError::MalformedArtifact { .. }) => "malformed_artifact",
            Self::Core(CoreError::Io { .. }) | Self::Io { .. } | Self::Output(_) => "io",
            Self::Tool(_) | Self::Invocation { .. } => "invocation",
        }
    }

    /// Multi-line diagnostic shown to the user.
    ///
    /// Collaborator failures name the command and point at the log; all other
    /// errors print their message.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Invocation {
                command, log_path, ..
            } => format!(
                "Error executing command line:\n\t{command}\nCheck log file: {}",
                log_path.display()
            ),
            other => other.to_string(),
        }
    }
}
