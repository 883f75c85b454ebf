//! Main entry point for the Chain Serving Gateway

use chain_gateway::{api, config::Settings, logging, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up OPENAI_API_KEY and overrides from .env
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::load()?;

    // Initialize logging
    logging::init_tracing(&settings.logging);

    info!("Starting Chain Serving Gateway");
    info!(
        "Loaded configuration: server={}:{}",
        settings.server.host, settings.server.port
    );

    let addr = settings.server.address();

    // Build backends and routes; a missing API key stops here
    let app_state = AppState::from_settings(settings).await?;

    // Build the router
    let app = api::routes::create_router(app_state);

    info!("Server listening on {}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
