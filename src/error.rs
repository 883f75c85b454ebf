//! Error types shared by the gateway, the assistant client and the chat tool

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Backend '{backend}' requires an API key: set `api_key` or the {env} environment variable")]
    MissingApiKey { backend: String, env: String },

    #[error("Backend not found: {0}")]
    BackendNotFound(String),

    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Invalid template: {0}")]
    Template(String),

    #[error("Missing template variable '{0}' in input")]
    MissingVariable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::RouteNotFound(_) | AppError::BackendNotFound(_) => StatusCode::NOT_FOUND,
            AppError::MissingVariable(_) | AppError::InvalidInput(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::BackendError(_) | AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::MissingApiKey { .. }
            | AppError::Template(_)
            | AppError::Io(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
