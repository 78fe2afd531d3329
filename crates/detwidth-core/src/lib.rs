//! # detwidth-core
//!
//! Foundation types shared by every detwidth crate:
//!
//! - **Automaton file model**: header (`stateCount`, `sourceState`) and record
//!   counting over the on-disk artifacts produced by the external collaborators
//! - **Verdicts**: parsing of the decision procedure's one-character answer file
//! - **Artifacts**: the suffix chain (`.min`, `.prmin`, …) and the per-run ledger
//!   of everything a run derived from its input
//! - **Errors**: [`CoreError`] via `thiserror`

#![deny(unsafe_code)]

pub mod artifacts;
pub mod automaton;
pub mod errors;
pub mod verdict;

pub use artifacts::{ArtifactKind, ArtifactLedger, with_suffix};
pub use automaton::{Header, HeaderPosition, count_records, read_header, read_header_at, read_trailer_header};
pub use errors::{CoreError, Result};
pub use verdict::{Verdict, parse_verdict, read_verdict};
