//! User-facing result rendering.

use std::fmt;

const HIGHLIGHT: &str = "\x1b[95m";
const RESET: &str = "\x1b[0m";
const RULE: &str = "#########";

/// What a finished run reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A single threshold query.
    Threshold {
        /// The threshold checked.
        p: usize,
        /// Whether the question was asked as "is it Wheeler?".
        wheeler: bool,
        /// Whether the width is below `p`.
        holds: bool,
    },
    /// An exact search.
    Exact {
        /// The deterministic width.
        width: usize,
        /// Oracle calls issued.
        queries: usize,
    },
}

impl Outcome {
    fn message(&self) -> String {
        match *self {
            Self::Threshold {
                wheeler: true,
                holds,
                ..
            } => {
                if holds {
                    "The regular language is Wheeler".to_string()
                } else {
                    "The regular language is NOT Wheeler".to_string()
                }
            }
            Self::Threshold { p, holds, .. } => {
                let relation = if holds {
                    "<(smaller than)"
                } else {
                    ">=(greater or equal than)"
                };
                format!("The deterministic width is {relation} {p}")
            }
            Self::Exact { width, .. } => format!("Regular language deterministic width: p = {width}"),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{HIGHLIGHT}{RULE}{RESET}")?;
        writeln!(f, "{HIGHLIGHT}    {}{RESET}", self.message())?;
        write!(f, "{HIGHLIGHT}{RULE}{RESET}")
    }
}
