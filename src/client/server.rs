//! HTTP surface of the browser assistant

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::client::api_client::{ApiClient, ApiOutcome};
use crate::client::assistant::{run_panel, PanelRequest, PanelResponse};
use crate::config::ClientSettings;

/// State shared by the assistant handlers
pub struct ClientState {
    pub api: ApiClient,
    pub settings: ClientSettings,
}

/// Result of one API-testing probe
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProbeResponse {
    Ok { body: Value },
    Error { error: String },
}

impl From<ApiOutcome> for ProbeResponse {
    fn from(outcome: ApiOutcome) -> Self {
        match outcome {
            ApiOutcome::Success(body) => ProbeResponse::Ok { body },
            ApiOutcome::Failure(err) => ProbeResponse::Error {
                error: err.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    pub docs_url: String,
}

async fn generate(
    State(state): State<Arc<ClientState>>,
    request: Result<Json<PanelRequest>, JsonRejection>,
) -> (StatusCode, Json<PanelResponse>) {
    match request {
        Ok(Json(request)) => (StatusCode::OK, Json(run_panel(&state.api, &request).await)),
        Err(rejection) => (
            rejection.status(),
            Json(PanelResponse::Error {
                error: format!("Invalid request: {}", rejection.body_text()),
                info: None,
            }),
        ),
    }
}

async fn probe_openai(State(state): State<Arc<ClientState>>) -> Json<ProbeResponse> {
    Json(state.api.get("openai/input_schema").await.into())
}

async fn probe_health(State(state): State<Arc<ClientState>>) -> Json<ProbeResponse> {
    Json(state.api.get("health").await.into())
}

async fn page_config(State(state): State<Arc<ClientState>>) -> Json<PageConfig> {
    Json(PageConfig {
        docs_url: format!("{}/docs", state.api.base_url()),
    })
}

/// Create the assistant router; anything outside `/api` is served from the static dir
pub fn create_client_router(state: Arc<ClientState>) -> Router {
    let assets = ServeDir::new(&state.settings.static_dir);

    Router::new()
        .route("/api/generate", post(generate))
        .route("/api/test/openai", get(probe_openai))
        .route("/api/test/health", get(probe_health))
        .route("/api/config", get(page_config))
        .with_state(state)
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
}
