//! Production implementations of the runner seam.

pub mod process;

pub use process::TokioProcessRunner;
