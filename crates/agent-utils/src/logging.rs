//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing subscriber with default configuration
///
/// Reads the filter from `RUST_LOG`, falling back to `info`.
pub fn init_tracing() {
    init_tracing_with("info", false);
}

/// Initialize tracing with an explicit default level and output format
///
/// `RUST_LOG` still wins when it is set. With `json` enabled every event is
/// emitted as one JSON object per line.
pub fn init_tracing_with(default_level: &str, json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()
    };

    if let Err(e) = result {
        // A global subscriber already exists (tests, embedding applications)
        tracing::debug!("tracing already initialized: {e}");
    }
}
