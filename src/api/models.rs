//! API request and response models

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Invoke request envelope
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct InvokeRequest {
    /// Route input, e.g. `{"topic": "Mars"}`; a string or message list for passthrough routes
    #[schema(value_type = Object)]
    pub input: Value,

    /// Accepted for compatibility, ignored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub config: Option<Value>,
}

/// Per-run metadata
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RunMetadata {
    pub run_id: String,
}

/// Invoke response envelope
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct InvokeResponse {
    pub output: String,
    pub metadata: RunMetadata,
}

/// Batch request envelope
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct BatchRequest {
    #[schema(value_type = Vec<Object>)]
    pub inputs: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub config: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct BatchMetadata {
    pub run_ids: Vec<String>,
}

/// Batch response envelope; outputs are in input order
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct BatchResponse {
    pub output: Vec<String>,
    pub metadata: BatchMetadata,
}

/// Route description for the health endpoint
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RouteInfo {
    pub path: String,
    pub backend: String,
    pub input_variables: Vec<String>,
}

/// Backend description for the health endpoint
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct BackendInfo {
    pub name: String,
    pub protocol: String,
    pub base_url: String,
    pub model: String,
    pub enabled: bool,
}

/// Health check response
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub title: String,
    pub version: String,
    pub timestamp: String,
    pub routes: Vec<RouteInfo>,
    pub backends: Vec<BackendInfo>,
}

/// Error body produced by failed requests
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}
