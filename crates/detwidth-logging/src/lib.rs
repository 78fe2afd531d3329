//! # detwidth-logging
//!
//! Diagnostic logging with `tracing`.
//!
//! Diagnostics go to stderr so they never interleave with the verdict printed
//! on stdout. The collaborators' own output is not routed through here; it is
//! appended to the per-run log file by `detwidth-tools`.

#![deny(unsafe_code)]

use tracing_subscriber::EnvFilter;

/// Level used when `--verbose` is given and the configured level is quieter.
pub const VERBOSE_LEVEL: &str = "info";

/// Pick the filter directive for this run.
///
/// Verbose runs are raised to [`VERBOSE_LEVEL`] unless the configured
/// level is already more detailed.
pub fn effective_level(configured: &str, verbose: bool) -> &str {
    if !verbose {
        return configured;
    }
    match configured.trim().to_lowercase().as_str() {
        "debug" | "trace" => configured,
        _ => VERBOSE_LEVEL,
    }
}

/// Initialize the global tracing subscriber with stderr output only.
///
/// Call once at application startup. Subsequent calls are no-ops.
/// `RUST_LOG` takes precedence over `level`.
pub fn init_subscriber(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    // set_global_default is a no-op if already set
    let _ = subscriber.try_init();
}
