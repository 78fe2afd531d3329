//! The run log.
//!
//! One file per run, opened in append mode. Every collaborator's stderr (and
//! stdout unless redirected to an artifact) lands here; the orchestrator only
//! ever writes to it, never reads it.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use crate::errors::ToolError;

/// Append-only log shared by all invocations of a run.
#[derive(Debug)]
pub struct RunLog {
    path: PathBuf,
    file: File,
}

impl RunLog {
    /// Open (creating if needed) the log at `path` and stamp the run start.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ToolError> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| ToolError::Log {
                path: path.clone(),
                source,
            })?;
        let log = Self { path, file };
        log.note(&format!(
            "=== detwidth run {} ===",
            chrono::Local::now().to_rfc3339()
        ))?;
        Ok(log)
    }

    /// Location of the log.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line written by the orchestrator itself.
    pub fn note(&self, line: &str) -> Result<(), ToolError> {
        let mut file = &self.file;
        writeln!(file, "{line}").map_err(|source| self.error(source))
    }

    /// A handle suitable as a child's stdout/stderr.
    pub fn stdio(&self) -> Result<Stdio, ToolError> {
        self.file
            .try_clone()
            .map(Stdio::from)
            .map_err(|source| self.error(source))
    }

    fn error(&self, source: std::io::Error) -> ToolError {
        ToolError::Log {
            path: self.path.clone(),
            source,
        }
    }
}
