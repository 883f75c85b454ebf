//! HTTP route definitions

use crate::api::handlers;
use crate::api::models::*;
use crate::backend::ChatMessage;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Chain Serving Gateway API",
        description = "Prompt chains served over HTTP",
        license(name = "MIT"),
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        handlers::invoke,
        handlers::batch,
        handlers::input_schema,
        handlers::output_schema,
        handlers::health_check,
    ),
    components(schemas(
        InvokeRequest,
        InvokeResponse,
        RunMetadata,
        BatchRequest,
        BatchResponse,
        BatchMetadata,
        HealthResponse,
        RouteInfo,
        BackendInfo,
        ErrorResponse,
        ChatMessage,
    )),
    tags(
        (name = "Chains", description = "Prompt chain forwarders"),
        (name = "Health", description = "Health and monitoring endpoints"),
    )
)]
pub struct ApiDoc;

/// Create the main application router
pub fn create_router(state: Arc<crate::AppState>) -> Router {
    let mut openapi = ApiDoc::openapi();
    openapi.info.title = state.settings.app.title.clone();
    openapi.info.version = state.settings.app.version.clone();
    openapi.info.description = Some(state.settings.app.description.clone());

    Router::new()
        // Health check endpoint
        .route("/health", get(handlers::health_check))
        // Interactive docs
        .merge(SwaggerUi::new("/docs").url("/openapi.json", openapi))
        // Forwarders, one set of endpoints per registered chain
        .route("/:name/invoke", post(handlers::invoke))
        .route("/:name/batch", post(handlers::batch))
        .route("/:name/input_schema", get(handlers::input_schema))
        .route("/:name/output_schema", get(handlers::output_schema))
        // Add shared state
        .with_state(state)
        .layer(CorsLayer::permissive())
        // Add tracing layer
        .layer(TraceLayer::new_for_http())
}
