//! Logging initialization

use tracing_subscriber::EnvFilter;

/// Initialize tracing with standard configuration (`info` unless `RUST_LOG` says otherwise)
pub fn init_tracing() {
    init_tracing_with_level("info");
}

/// Initialize tracing with the configured level; `RUST_LOG` still takes precedence.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .try_init();
}
