// ============================================================================
// Logging
// Subscriber setup for binaries and demos embedding the engine
// ============================================================================

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `RUST_LOG`, falling back to `info`.
pub fn init_tracing() {
    init_tracing_with_default("info");
}

/// Install a `fmt` subscriber filtered by `RUST_LOG`, falling back to `default_level`.
///
/// A subscriber that is already installed is left in place.
pub fn init_tracing_with_default(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_tracing_with_default("debug");
        init_tracing();
        tracing::debug!("subscriber installed");
    }
}
