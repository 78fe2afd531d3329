//! Decision oracle adapter.
//!
//! The decision procedure answers "is the deterministic width below `p`?" by
//! writing `1` or `0` to a fixed-name file in its working directory. The adapter
//! runs it inside a scratch directory owned by the current run, reads that file
//! as soon as the process exits, and hands the answer back as a plain `bool`.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use detwidth_core::read_verdict;
use detwidth_tools::{Invocation, ProcessRunner, RunLog, collaborators};
use tracing::debug;

use crate::errors::RuntimeError;

/// A monotone threshold predicate over `p`.
///
/// Taking `&mut self` keeps queries strictly sequential: the next query
/// cannot start before the previous verdict has been read.
#[async_trait]
pub trait ThresholdOracle: Send {
    /// Whether the threshold predicate holds for `p`.
    async fn query(&mut self, p: usize) -> Result<bool, RuntimeError>;
}

/// Oracle backed by the external decision procedure.
pub struct ProcessOracle<'a> {
    runner: &'a dyn ProcessRunner,
    log: &'a RunLog,
    executable: PathBuf,
    automaton: PathBuf,
    interval: PathBuf,
    scratch: PathBuf,
    verdict_file: String,
}

impl<'a> ProcessOracle<'a> {
    /// Build an oracle over the given automaton and interval artifacts.
    ///
    /// The decision procedure runs inside `scratch`, so every path handed
    /// to it is made absolute here.
    pub fn new(
        runner: &'a dyn ProcessRunner,
        log: &'a RunLog,
        executable: &Path,
        automaton: &Path,
        interval: &Path,
        scratch: &Path,
        verdict_file: &str,
    ) -> Result<Self, RuntimeError> {
        Ok(Self {
            runner,
            log,
            executable: absolute(executable)?,
            automaton: absolute(automaton)?,
            interval: absolute(interval)?,
            scratch: scratch.to_path_buf(),
            verdict_file: verdict_file.to_string(),
        })
    }

    /// Where the decision procedure leaves its verdict.
    pub fn verdict_path(&self) -> PathBuf {
        self.scratch.join(&self.verdict_file)
    }

    /// The invocation issued for threshold `p`.
    pub fn invocation(&self, p: usize) -> Invocation {
        collaborators::decide(&self.executable, p, &self.automaton, &self.interval, &self.scratch)
    }

    fn clear_verdict(&self) -> Result<(), RuntimeError> {
        let path = self.verdict_path();
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(RuntimeError::Io { path, source }),
        }
    }
}

#[async_trait]
impl ThresholdOracle for ProcessOracle<'_> {
    async fn query(&mut self, p: usize) -> Result<bool, RuntimeError> {
        self.clear_verdict()?;
        let invocation = self.invocation(p);
        let outcome = self.runner.run(&invocation, self.log).await?;
        if !outcome.success() {
            return Err(RuntimeError::invocation(
                &invocation,
                outcome.exit_code,
                self.log.path(),
            ));
        }
        let holds = read_verdict(&self.verdict_path());
        debug!(p, holds, "oracle verdict");
        Ok(holds)
    }
}

fn absolute(path: &Path) -> Result<PathBuf, RuntimeError> {
    std::path::absolute(path).map_err(|source| RuntimeError::Io {
        path: path.to_path_buf(),
        source,
    })
}
