//! Library Relay
//!
//! Client-facing gateway that forwards authenticated calls to the backend.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;

use library_server::{
    auth::TokenVerifier,
    config::RelayConfig,
    logging,
    relay::{self, BackendClient, RelayState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = RelayConfig::load().context("Failed to load relay configuration")?;

    logging::init(&config.logging);

    tracing::info!(
        "Starting Library Relay v{} (backend {})",
        env!("CARGO_PKG_VERSION"),
        config.backend.base_url
    );

    let verifier = TokenVerifier::new(&config.auth).context("Invalid auth configuration")?;
    let backend = BackendClient::new(&config.backend).context("Invalid backend configuration")?;

    let addr = SocketAddr::new(
        config
            .server
            .host
            .parse()
            .context("Invalid host address")?,
        config.server.port,
    );

    let state = RelayState {
        config: Arc::new(config),
        verifier: Arc::new(verifier),
        backend,
    };

    let app = relay::router(state);

    tracing::info!("Relay listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
