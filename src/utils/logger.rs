//! Logging utilities
//!
//! Configures the tracing subscriber for embedding applications and tests.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `directive` is used when `RUST_LOG` is not set (e.g. `"suite_engine=info"`).
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init_logger(directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_is_repeatable() {
        init_logger("suite_engine=debug");
        init_logger("suite_engine=info");
    }
}
