pub mod config;
pub mod models;
pub mod db;
pub mod provider;
pub mod analysis;
pub mod alerts;
pub mod engine;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries and integration tests.
///
/// Honors `RUST_LOG` when set, otherwise falls back to the default filter.
/// Safe to call more than once — subsequent calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}
