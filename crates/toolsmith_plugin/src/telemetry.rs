//! Tracing subscriber setup.
//!
//! Installs a global `tracing` subscriber from a [`TracingConfig`]. The
//! subscriber is installed at most once per process; later calls are no-ops,
//! so a host that already installed its own subscriber keeps it.

use crate::config::{TracingConfig, TracingFormat};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Builds the filter for `config`: its env filter if it parses, else its level.
#[must_use]
pub fn env_filter(config: &TracingConfig) -> EnvFilter {
    let level = config.max_level();
    match &config.env_filter {
        Some(filter) => EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(level.as_str())),
        None => EnvFilter::new(level.as_str()),
    }
}

/// Installs the global subscriber described by `config`.
///
/// Returns `true` if this call installed it.
pub fn init(config: &TracingConfig) -> bool {
    let filter = env_filter(config);
    let span_events = if config.span_events {
        FmtSpan::ENTER | FmtSpan::EXIT
    } else {
        FmtSpan::NONE
    };

    let installed = match config.format {
        TracingFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_span_events(span_events),
            )
            .try_init()
            .is_ok(),
        TracingFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_span_events(span_events),
            )
            .try_init()
            .is_ok(),
        TracingFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_span_events(span_events),
            )
            .try_init()
            .is_ok(),
    };

    if installed {
        tracing::info!(
            level = %config.max_level(),
            format = ?config.format,
            "toolsmith tracing initialized"
        );
    }
    installed
}
