//! The external-stage seam.
//!
//! An [`Invocation`] is a fully built command: program, arguments, optional
//! stdin/stdout redirection, and working directory. A [`ProcessRunner`] runs it
//! to completion with stderr (and stdout, unless redirected) appended to the
//! run log.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::collaborators::Stage;
use crate::errors::ToolError;
use crate::log::RunLog;

/// Where a collaborator's standard output goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputTarget {
    /// Appended to the run log.
    Log,
    /// Written (truncating) to an artifact.
    File(PathBuf),
}

/// A single collaborator command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    /// Pipeline stage this command belongs to.
    pub stage: Stage,
    /// Executable.
    pub program: PathBuf,
    /// Positional arguments.
    pub args: Vec<String>,
    /// File fed to standard input.
    pub stdin: Option<PathBuf>,
    /// Standard output destination.
    pub stdout: OutputTarget,
    /// Working directory (inherited when `None`).
    pub working_directory: Option<PathBuf>,
}

impl Invocation {
    /// Invocation of `program` with no arguments and output to the log.
    pub fn new(stage: Stage, program: impl Into<PathBuf>) -> Self {
        Self {
            stage,
            program: program.into(),
            args: Vec::new(),
            stdin: None,
            stdout: OutputTarget::Log,
            working_directory: None,
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a path argument.
    #[must_use]
    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.display().to_string())
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Feed `path` to standard input.
    #[must_use]
    pub fn stdin_from(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin = Some(path.into());
        self
    }

    /// Write standard output to `path`.
    #[must_use]
    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = OutputTarget::File(path.into());
        self
    }

    /// Run inside `dir`.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Shell-like rendering used in diagnostics and verbose output.
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        if let Some(stdin) = &self.stdin {
            let _ = write!(line, " < {}", stdin.display());
        }
        if let OutputTarget::File(path) = &self.stdout {
            let _ = write!(line, " > {}", path.display());
        }
        line
    }
}

/// Result of a completed process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Exit code (`-1` when terminated by a signal).
    pub exit_code: i32,
    /// Wall-clock duration.
    pub duration: Duration,
}

impl ProcessOutcome {
    /// Whether the process exited with status zero.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs collaborator invocations.
///
/// Implementations must not return before the process has exited and every
/// output artifact it writes is complete.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `invocation` to completion, appending its diagnostics to `log`.
    async fn run(&self, invocation: &Invocation, log: &RunLog) -> Result<ProcessOutcome, ToolError>;
}
