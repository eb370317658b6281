//! `tracing` subscriber setup for binaries and tests embedding the adapter.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured level. Returns `false` when a
/// subscriber was already installed, which leaves the existing one in place.
pub fn init(settings: &LoggingSettings) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let installed = if settings.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.is_ok()
}
