//! Logging subscriber initialisation.

use tracing_subscriber::{EnvFilter, util::SubscriberInitExt};

/// Install an env-filtered fmt subscriber.
///
/// Intended for demos and hosts that have not set up their own tracing;
/// if a global subscriber is already installed this is a no-op.
pub fn init() {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_target(true)
        .with_env_filter(build_env_filter())
        .finish();

    if subscriber.try_init().is_err() {
        tracing::debug!("tracing subscriber already installed; keeping the existing one");
    }
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,h2=warn"))
}
