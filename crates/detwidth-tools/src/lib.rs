//! # detwidth-tools
//!
//! Everything needed to drive the external collaborators:
//! - **Seam**: [`ProcessRunner`] runs one [`Invocation`] and reports its exit
//!   code and duration; tests substitute scripted runners
//! - **Provider**: [`TokioProcessRunner`] spawns real processes with
//!   `tokio::process::Command`
//! - **Run log**: [`RunLog`], the append-only file every collaborator writes to
//! - **Collaborators**: command builders for the compiler, minimizer, pruner,
//!   partition refiner, merger, and decision procedure

#![deny(unsafe_code)]

pub mod collaborators;
pub mod errors;
pub mod log;
pub mod providers;
pub mod traits;

pub use collaborators::{RefinementMode, Stage, ToolPaths};
pub use errors::ToolError;
pub use log::RunLog;
pub use providers::TokioProcessRunner;
pub use traits::{Invocation, OutputTarget, ProcessOutcome, ProcessRunner};
