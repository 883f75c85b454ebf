//! HTTP request handlers for the chain forwarders

use crate::api::extractors::AppJson;
use crate::api::models::{
    BackendInfo, BatchMetadata, BatchRequest, BatchResponse, ErrorResponse, HealthResponse,
    InvokeRequest, InvokeResponse, RouteInfo, RunMetadata,
};
use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Run a route's chain once
#[utoipa::path(
    post,
    path = "/{name}/invoke",
    tag = "Chains",
    params(("name" = String, Path, description = "Route name, e.g. essay")),
    request_body = InvokeRequest,
    responses(
        (status = 200, description = "Generated text", body = InvokeResponse),
        (status = 404, description = "Unknown route", body = ErrorResponse),
        (status = 422, description = "Malformed body or input that does not fit the route template", body = ErrorResponse),
        (status = 502, description = "Backend failed", body = ErrorResponse),
    )
)]
pub async fn invoke(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    AppJson(request): AppJson<InvokeRequest>,
) -> Result<Json<InvokeResponse>, AppError> {
    let chain = state.chain_registry.get(&name)?;
    let run_id = Uuid::new_v4().to_string();

    info!(route = %name, run_id = %run_id, "Received invoke request");

    let output = chain.invoke(&request.input).await?;

    info!(route = %name, run_id = %run_id, output_len = output.len(), "Invoke completed");

    Ok(Json(InvokeResponse {
        output,
        metadata: RunMetadata { run_id },
    }))
}

/// Run a route's chain over several inputs
#[utoipa::path(
    post,
    path = "/{name}/batch",
    tag = "Chains",
    params(("name" = String, Path, description = "Route name")),
    request_body = BatchRequest,
    responses(
        (status = 200, description = "Generated texts in input order", body = BatchResponse),
        (status = 404, description = "Unknown route", body = ErrorResponse),
        (status = 422, description = "Malformed body or an input that does not fit the route template", body = ErrorResponse),
        (status = 502, description = "Backend failed", body = ErrorResponse),
    )
)]
pub async fn batch(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    AppJson(request): AppJson<BatchRequest>,
) -> Result<Json<BatchResponse>, AppError> {
    let chain = state.chain_registry.get(&name)?;

    info!(route = %name, inputs = request.inputs.len(), "Received batch request");

    let output = chain.batch(&request.inputs).await?;
    let run_ids = output.iter().map(|_| Uuid::new_v4().to_string()).collect();

    Ok(Json(BatchResponse {
        output,
        metadata: BatchMetadata { run_ids },
    }))
}

/// JSON Schema of a route's input
#[utoipa::path(
    get,
    path = "/{name}/input_schema",
    tag = "Chains",
    params(("name" = String, Path, description = "Route name")),
    responses(
        (status = 200, description = "JSON Schema"),
        (status = 404, description = "Unknown route", body = ErrorResponse),
    )
)]
pub async fn input_schema(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.chain_registry.get(&name)?.input_schema()))
}

/// JSON Schema of a route's output
#[utoipa::path(
    get,
    path = "/{name}/output_schema",
    tag = "Chains",
    params(("name" = String, Path, description = "Route name")),
    responses(
        (status = 200, description = "JSON Schema"),
        (status = 404, description = "Unknown route", body = ErrorResponse),
    )
)]
pub async fn output_schema(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.chain_registry.get(&name)?.output_schema()))
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Gateway status", body = HealthResponse))
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, AppError> {
    let title = state.settings.app.title.clone();
    let version = state.settings.app.version.clone();

    let mut routes = Vec::new();
    for name in state.chain_registry.names() {
        let chain = state.chain_registry.get(&name)?;
        routes.push(RouteInfo {
            backend: chain.backend().name().to_string(),
            input_variables: chain.input_variables(),
            path: name,
        });
    }

    let backends = state
        .text_registry
        .list_backends()
        .await
        .into_iter()
        .map(|b| BackendInfo {
            name: b.name,
            protocol: b.protocol,
            base_url: b.base_url,
            model: b.model,
            enabled: b.enabled,
        })
        .collect();

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        title,
        version,
        timestamp: Utc::now().to_rfc3339(),
        routes,
        backends,
    }))
}
