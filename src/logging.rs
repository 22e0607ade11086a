//! Diagnostic logging for the binary.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Install a stderr subscriber filtered by `RUST_LOG`. Stdout carries only
/// generated text.
///
/// Returns false when a global subscriber was already installed; the existing
/// one stays in place.
pub fn init_logging() -> bool {
    let result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    match result {
        Ok(()) => true,
        Err(error) => {
            eprintln!("warning: logging not initialized: {error}");
            false
        }
    }
}
