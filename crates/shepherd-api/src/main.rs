//! bundle-shepherd API server

use std::net::SocketAddr;
use std::path::PathBuf;

use shepherd_api::{AppState, Backends, init_tracing, routes};
use shepherd_aws::AwsServices;
use shepherd_config::RuntimeConfig;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Invalid configuration stops the server before any AWS client exists.
    let config_path = std::env::var_os("SHEPHERD_CONFIG").map(PathBuf::from);
    let config = RuntimeConfig::load(config_path.as_deref())?;
    info!(config = ?config, "Configuration loaded");

    let aws = AwsServices::load(config.region()).await;
    let state = AppState::new(config, Backends::from(aws));

    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = std::env::var("SHEPHERD_BIND")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;
    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
