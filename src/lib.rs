//! Chain Serving Gateway
//!
//! Serves prompt chains (a template piped into a cloud or local text generation
//! backend) over HTTP, plus the browser assistant that calls them and a standalone
//! chat tool for the local model.

pub mod api;
pub mod backend;
pub mod chain;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;

pub use error::{AppError, Result};

use std::sync::Arc;
use tracing::info;

use backend::TextBackendRegistry;
use chain::ChainRegistry;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<config::Settings>,
    pub text_registry: Arc<TextBackendRegistry>,
    pub chain_registry: Arc<ChainRegistry>,
}

impl AppState {
    /// Validate the settings, build every enabled backend and mount every route.
    ///
    /// Fails when a cloud backend has no API key or a route points at a backend that
    /// is missing or disabled.
    pub async fn from_settings(settings: config::Settings) -> Result<Arc<Self>> {
        settings.validate()?;

        let text_registry = Arc::new(TextBackendRegistry::new());
        for backend_config in settings.get_enabled_backends() {
            text_registry.add_backend(backend_config.clone()).await?;
        }
        info!("Registered {} text backends", text_registry.len());

        let chain_registry = Arc::new(ChainRegistry::new());
        for route in &settings.routes {
            chain_registry.add_route(route, &text_registry).await?;
        }
        info!("Registered {} routes", chain_registry.len());

        Ok(Arc::new(AppState {
            settings: Arc::new(settings),
            text_registry,
            chain_registry,
        }))
    }
}
