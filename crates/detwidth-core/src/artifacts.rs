//! Derived artifacts and the per-run ledger.
//!
//! Every intermediate artifact is named after the automaton it was derived
//! from plus a fixed suffix, so the whole chain sits next to the input:
//! `input.min`, `input.min.prmin`, `input.min.infima`, and so on.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Kinds of derived artifacts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Minimum DFA compiled from a regular expression.
    RegexDfa,
    /// Minimum DFA computed from an input DFA.
    Minimized,
    /// Pruned automaton used for the infimum strings.
    PrunedMin,
    /// Pruned automaton used for the supremum strings.
    PrunedMax,
    /// Infimum string automaton.
    Infima,
    /// Supremum string automaton.
    Suprema,
    /// Merged interval artifact.
    Interval,
    /// The run log.
    Log,
}

impl ArtifactKind {
    /// Suffix appended to the source path.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::RegexDfa => ".mdfa",
            Self::Minimized => ".min",
            Self::PrunedMin => ".prmin",
            Self::PrunedMax => ".prmax",
            Self::Infima => ".infima",
            Self::Suprema => ".suprema",
            Self::Interval => ".interval",
            Self::Log => ".log",
        }
    }

    /// Path of this artifact derived from `source`.
    pub fn derive(self, source: &Path) -> PathBuf {
        with_suffix(source, self.suffix())
    }
}

/// Append `suffix` to the full path (not replacing any extension).
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// Everything one run created on disk.
#[derive(Clone, Debug, Default)]
pub struct ArtifactLedger {
    artifacts: Vec<PathBuf>,
    log: Option<PathBuf>,
    scratch: Option<PathBuf>,
}

impl ArtifactLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a derived artifact. Duplicates are ignored.
    pub fn record(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.artifacts.contains(&path) {
            self.artifacts.push(path);
        }
    }

    /// Record the run log.
    pub fn set_log(&mut self, path: impl Into<PathBuf>) {
        self.log = Some(path.into());
    }

    /// Record the scratch directory used for transient oracle output.
    pub fn set_scratch(&mut self, path: impl Into<PathBuf>) {
        self.scratch = Some(path.into());
    }

    /// Derived artifacts in creation order.
    pub fn artifacts(&self) -> &[PathBuf] {
        &self.artifacts
    }

    /// The run log, if one was opened.
    pub fn log(&self) -> Option<&Path> {
        self.log.as_deref()
    }

    /// The scratch directory, if one was created.
    pub fn scratch(&self) -> Option<&Path> {
        self.scratch.as_deref()
    }
}
