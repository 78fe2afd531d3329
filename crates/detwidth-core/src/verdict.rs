//! Decision-procedure verdicts.
//!
//! The decision procedure writes a single character to its answer file: `1`
//! when the threshold predicate holds, `0` otherwise. Anything else is read as
//! "does not hold", but is classified separately so callers can report it.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::warn;

/// Classified content of an answer file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The literal `1`.
    Holds,
    /// The literal `0`.
    DoesNotHold,
    /// Any other first line, including an empty or missing file.
    Unexpected(String),
}

impl Verdict {
    /// Whether the predicate holds. Only [`Verdict::Holds`] is true.
    pub fn holds(&self) -> bool {
        matches!(self, Self::Holds)
    }
}

/// Classify the first line of an answer file.
pub fn parse_verdict(first_line: &str) -> Verdict {
    match first_line.trim() {
        "1" => Verdict::Holds,
        "0" => Verdict::DoesNotHold,
        other => Verdict::Unexpected(other.to_string()),
    }
}

/// Read the answer file at `path` and return whether the predicate holds.
///
/// Never fails: an unreadable file counts as a negative verdict and is
/// reported with a warning.
pub fn read_verdict(path: &Path) -> bool {
    let verdict = match File::open(path) {
        Ok(file) => {
            let mut line = String::new();
            match BufReader::new(file).read_line(&mut line) {
                Ok(_) => parse_verdict(&line),
                Err(e) => Verdict::Unexpected(format!("<unreadable: {e}>")),
            }
        }
        Err(e) => Verdict::Unexpected(format!("<missing: {e}>")),
    };
    if let Verdict::Unexpected(content) = &verdict {
        warn!(path = %path.display(), content = %content, "unexpected verdict content, treating as negative");
    }
    verdict.holds()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_literals() {
        assert_eq!(parse_verdict("1"), Verdict::Holds);
        assert_eq!(parse_verdict("0"), Verdict::DoesNotHold);
        assert_eq!(parse_verdict("1\n"), Verdict::Holds);
        assert_eq!(parse_verdict(""), Verdict::Unexpected(String::new()));
        assert_eq!(parse_verdict("yes"), Verdict::Unexpected("yes".into()));
    }

    #[test]
    fn only_holds_is_true() {
        assert!(Verdict::Holds.holds());
        assert!(!Verdict::DoesNotHold.holds());
        assert!(!Verdict::Unexpected("11".into()).holds());
    }

    #[test]
    fn round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answer");

        std::fs::write(&path, "1").unwrap();
        assert!(read_verdict(&path));

        std::fs::write(&path, "0").unwrap();
        assert!(!read_verdict(&path));
    }

    #[test]
    fn only_first_line_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answer");
        std::fs::write(&path, "0\n1\n").unwrap();
        assert!(!read_verdict(&path));
    }

    #[test]
    fn empty_or_missing_is_negative() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answer");
        assert!(!read_verdict(&path));

        std::fs::write(&path, "").unwrap();
        assert!(!read_verdict(&path));
    }
}
