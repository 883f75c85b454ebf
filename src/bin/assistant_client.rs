//! Browser assistant: essay and poem panels backed by the gateway

use chain_gateway::{
    client::{create_client_router, ApiClient, ClientState},
    config::ClientSettings,
    logging,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = ClientSettings::load()?;
    settings.validate()?;

    logging::init_tracing(&settings.logging);

    let api = ApiClient::new(settings.api_url.clone())?;
    let addr = settings.server.address();

    info!(api_url = %settings.api_url, static_dir = %settings.static_dir, "Starting assistant client");

    let state = Arc::new(ClientState { api, settings });
    let app = create_client_router(state);

    info!("Assistant listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
