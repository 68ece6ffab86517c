//! Observability wiring.
//!
//! The pipeline reports every degraded path through `tracing` and `metrics`
//! rather than a console, so hosts can route failures to whatever subscriber
//! or recorder they already run. This module only offers a convenience
//! initializer for hosts that have none.

use tracing_subscriber::EnvFilter;

/// Initializes a stderr `tracing` subscriber with env-filter support.
///
/// Honors `RUST_LOG`; defaults to `warn` for this crate so a quiet host
/// stays quiet. Safe to call when a global subscriber is already installed —
/// the attempt is simply ignored.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("engram=warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_reentrant() {
        init_logging();
        init_logging();
    }
}
