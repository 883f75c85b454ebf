//! Generic caller for the gateway's HTTP endpoints

use reqwest::{Client, Response, Url};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{AppError, Result};

/// Why a call did not produce a usable body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with something other than 200
    #[error("API Error: {code} - {body}")]
    Status { code: u16, body: String },

    /// The server could not be reached
    #[error("Cannot connect to the server. Make sure the gateway server is running on {target}")]
    Connection { target: String },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Outcome of one call; never a transport error
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome {
    Success(Value),
    Failure(ApiError),
}

impl ApiOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ApiOutcome::Success(_))
    }

    /// The body on success, `{"error": "<message>"}` otherwise
    pub fn into_json(self) -> Value {
        match self {
            ApiOutcome::Success(body) => body,
            ApiOutcome::Failure(err) => json!({ "error": err.to_string() }),
        }
    }
}

/// Calls `{base_url}/{endpoint}` and classifies the result
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(base_url, http))
    }

    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// `host:port` named in the connection advisory
    fn target(&self) -> String {
        Url::parse(&self.base_url)
            .ok()
            .and_then(|url| {
                let host = url.host_str()?.to_string();
                Some(match url.port_or_known_default() {
                    Some(port) => format!("{}:{}", host, port),
                    None => host,
                })
            })
            .unwrap_or_else(|| self.base_url.clone())
    }

    /// POST `payload` as JSON to `endpoint`
    pub async fn call(&self, endpoint: &str, payload: &Value) -> ApiOutcome {
        let url = self.url(endpoint);
        debug!(url = %url, "Calling API");
        let result = self.http.post(&url).json(payload).send().await;
        self.classify(result).await
    }

    /// GET `endpoint`
    pub async fn get(&self, endpoint: &str) -> ApiOutcome {
        let url = self.url(endpoint);
        debug!(url = %url, "Calling API");
        let result = self.http.get(&url).send().await;
        self.classify(result).await
    }

    async fn classify(&self, result: reqwest::Result<Response>) -> ApiOutcome {
        let response = match result {
            Ok(response) => response,
            Err(e) if e.is_connect() => {
                warn!(base_url = %self.base_url, error = %e, "API server unreachable");
                return ApiOutcome::Failure(ApiError::Connection {
                    target: self.target(),
                });
            }
            Err(e) => return ApiOutcome::Failure(ApiError::Unexpected(e.to_string())),
        };

        let status = response.status();
        if status.as_u16() != 200 {
            let body = response.text().await.unwrap_or_default();
            return ApiOutcome::Failure(ApiError::Status {
                code: status.as_u16(),
                body,
            });
        }

        match response.json::<Value>().await {
            Ok(body) => ApiOutcome::Success(body),
            Err(e) => ApiOutcome::Failure(ApiError::Unexpected(e.to_string())),
        }
    }
}
