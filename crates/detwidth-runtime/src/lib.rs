//! # detwidth-runtime
//!
//! Drives one width computation end to end:
//! - **Pipeline**: [`Pipeline`] sequences the collaborator stages, threading
//!   each stage's artifacts into the next
//! - **Oracle**: [`ProcessOracle`] turns one decision-procedure run into a
//!   boolean verdict
//! - **Search**: [`exact_width`] finds the width with an exponential probe
//!   followed by a binary search
//! - **Cleanup**: [`cleanup`] removes (or keeps) what the run left behind
//! - **Report**: [`Outcome`] renders the final answer

#![deny(unsafe_code)]

pub mod cleanup;
pub mod errors;
pub mod oracle;
pub mod pipeline;
pub mod report;
pub mod search;

pub use cleanup::{RunStatus, cleanup};
pub use errors::RuntimeError;
pub use oracle::{ProcessOracle, ThresholdOracle};
pub use pipeline::{InputKind, Pipeline, RunContext, RunMode, RunRequest};
pub use report::Outcome;
pub use search::{SearchOutcome, exact_width};
