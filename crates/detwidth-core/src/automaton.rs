//! Automaton file model.
//!
//! The orchestrator only needs two facts about an automaton artifact: how many
//! states it has and which state is the source. Both live in the header record
//! (token 0 and token 2; token 1 is owned by the collaborators). Every other
//! record is opaque. Interval artifacts are even less visible: only their
//! record count matters.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};

const STATE_COUNT_TOKEN: usize = 0;
const SOURCE_STATE_TOKEN: usize = 2;

/// The header facts of an automaton artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// Number of states.
    pub state_count: usize,
    /// Index of the source (initial) state.
    pub source_state: usize,
}

impl Header {
    /// Check `source_state < state_count`.
    pub fn validate(self, path: &Path) -> Result<Self> {
        if self.source_state >= self.state_count {
            return Err(CoreError::malformed(
                path,
                format!(
                    "source state {} out of range for {} states",
                    self.source_state, self.state_count
                ),
            ));
        }
        Ok(self)
    }
}

/// Which record of an artifact carries the header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderPosition {
    /// The first record.
    #[default]
    First,
    /// The last non-empty record.
    Last,
}

impl HeaderPosition {
    /// Parse from a settings/env string (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "first" => Some(Self::First),
            "last" => Some(Self::Last),
            _ => None,
        }
    }
}

/// Read the header from the first record of `path`.
pub fn read_header(path: &Path) -> Result<Header> {
    let file = File::open(path).map_err(|e| CoreError::io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    let _ = reader
        .read_until(b'\n', &mut line)
        .map_err(|e| CoreError::io(path, e))?;
    parse_header(&String::from_utf8_lossy(&line), path)
}

/// Read the header from the last non-empty record of `path`.
///
/// Some collaborators emit their automaton edge by edge and only know the
/// final state count once they are done, so the header trails the edges.
pub fn read_trailer_header(path: &Path) -> Result<Header> {
    let mut raw = Vec::new();
    let _ = File::open(path)
        .and_then(|mut f| f.read_to_end(&mut raw))
        .map_err(|e| CoreError::io(path, e))?;
    let content = String::from_utf8_lossy(&raw);
    let last = content
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or_default();
    parse_header(last, path)
}

/// Read the header from the record selected by `position`.
pub fn read_header_at(path: &Path, position: HeaderPosition) -> Result<Header> {
    match position {
        HeaderPosition::First => read_header(path),
        HeaderPosition::Last => read_trailer_header(path),
    }
}

/// Parse a single header record.
pub fn parse_header(record: &str, path: &Path) -> Result<Header> {
    let tokens: Vec<&str> = record.split_whitespace().collect();
    if tokens.len() <= SOURCE_STATE_TOKEN {
        return Err(CoreError::malformed(
            path,
            format!(
                "header has {} tokens, expected at least {}",
                tokens.len(),
                SOURCE_STATE_TOKEN + 1
            ),
        ));
    }
    let state_count = parse_token(tokens[STATE_COUNT_TOKEN], "state count", path)?;
    let source_state = parse_token(tokens[SOURCE_STATE_TOKEN], "source state", path)?;
    Ok(Header {
        state_count,
        source_state,
    })
}

fn parse_token(token: &str, what: &str, path: &Path) -> Result<usize> {
    token
        .parse()
        .map_err(|_| CoreError::malformed(path, format!("{what} {token:?} is not an integer")))
}

/// Count the records (lines) of an artifact.
///
/// A final record without a line terminator still counts.
pub fn count_records(path: &Path) -> Result<usize> {
    let file = File::open(path).map_err(|e| CoreError::io(path, e))?;
    let mut count = 0;
    for segment in BufReader::new(file).split(b'\n') {
        let _ = segment.map_err(|e| CoreError::io(path, e))?;
        count += 1;
    }
    Ok(count)
}
