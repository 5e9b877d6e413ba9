//! Telemetry initialization.
//!
//! Sets up `tracing-subscriber` with an `EnvFilter` (default level `info`,
//! override via `RUST_LOG`) and a console fmt layer. All request handling is
//! traced through `tower_http::trace::TraceLayer`, wired up in
//! [`crate::build_router`].

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize tracing for the process.
///
/// Safe to call once per process; returns an error if a global subscriber is
/// already installed.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    info!("Telemetry initialized");

    Ok(())
}
