//! HTTP surface for bundle-shepherd.
//!
//! Receives GitHub push webhooks and build-state-change events and runs one
//! [`Activation`] per request.

pub mod activation;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use activation::{Activation, Backends};
pub use state::AppState;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` sets the filter (default `info`); `SHEPHERD_LOG_FORMAT=json`
/// switches to JSON lines.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if std::env::var("SHEPHERD_LOG_FORMAT").is_ok_and(|format| format == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
}
