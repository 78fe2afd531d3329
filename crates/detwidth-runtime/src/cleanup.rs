//! End-of-run artifact removal.
//!
//! | status    | keep  | artifacts | log     | scratch |
//! |-----------|-------|-----------|---------|---------|
//! | succeeded | no    | removed   | removed | removed |
//! | succeeded | yes   | kept      | kept    | removed |
//! | failed    | any   | kept      | kept    | removed |

use std::io;
use std::path::Path;

use detwidth_core::ArtifactLedger;
use tracing::{debug, warn};

/// How the run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// The result was printed.
    Succeeded,
    /// A stage aborted the run.
    Failed,
}

/// Apply the cleanup policy to everything the run recorded.
///
/// Removal failures are logged and otherwise ignored; they never change the
/// run's outcome.
pub fn cleanup(ledger: &ArtifactLedger, keep: bool, status: RunStatus) {
    if let Some(scratch) = ledger.scratch() {
        remove(scratch, true);
    }
    if keep || status == RunStatus::Failed {
        debug!(?status, keep, artifacts = ledger.artifacts().len(), "keeping artifacts");
        return;
    }
    for artifact in ledger.artifacts() {
        remove(artifact, false);
    }
    if let Some(log) = ledger.log() {
        remove(log, false);
    }
}

fn remove(path: &Path, dir: bool) {
    let result = if dir {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    match result {
        Ok(()) => debug!(path = %path.display(), "removed"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "cannot remove"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct Run {
        _dir: tempfile::TempDir,
        ledger: ArtifactLedger,
        files: Vec<PathBuf>,
        scratch: PathBuf,
    }

    fn run() -> Run {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ArtifactLedger::new();
        let mut files = Vec::new();
        for name in ["l.dfa.min", "l.dfa.min.prmin", "l.dfa.min.interval"] {
            let path = dir.path().join(name);
            std::fs::write(&path, "x").unwrap();
            ledger.record(&path);
            files.push(path);
        }
        let log = dir.path().join("l.dfa.log");
        std::fs::write(&log, "log").unwrap();
        ledger.set_log(&log);
        files.push(log);

        let scratch = dir.path().join(".detwidth-scratch");
        std::fs::create_dir(&scratch).unwrap();
        std::fs::write(scratch.join("answer"), "1").unwrap();
        ledger.set_scratch(&scratch);

        Run {
            _dir: dir,
            ledger,
            files,
            scratch,
        }
    }

    #[test]
    fn success_removes_everything() {
        let r = run();
        cleanup(&r.ledger, false, RunStatus::Succeeded);
        assert!(r.files.iter().all(|f| !f.exists()));
        assert!(!r.scratch.exists());
    }

    #[test]
    fn keep_preserves_artifacts_and_log() {
        let r = run();
        cleanup(&r.ledger, true, RunStatus::Succeeded);
        assert!(r.files.iter().all(|f| f.exists()));
        assert!(!r.scratch.exists());
    }

    #[test]
    fn failure_preserves_artifacts_and_log() {
        let r = run();
        cleanup(&r.ledger, false, RunStatus::Failed);
        assert!(r.files.iter().all(|f| f.exists()));
        assert!(!r.scratch.exists());
    }

    #[test]
    fn missing_files_are_ignored() {
        let r = run();
        std::fs::remove_file(&r.files[0]).unwrap();
        cleanup(&r.ledger, false, RunStatus::Succeeded);
        assert!(r.files.iter().all(|f| !f.exists()));
    }
}
