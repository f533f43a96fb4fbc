//! Installs the global `tracing` subscriber.

use tracing_subscriber::EnvFilter;

/// Logs go to stderr, where `pam_exec` (with its `log=` option) or the
/// journal picks them up. `RUST_LOG` takes precedence over `level`.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A second call (e.g. after a configuration error) is a no-op.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .try_init();
}
