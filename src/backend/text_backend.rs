//! Text generation backends
//! Supports the chat completions API (OpenAI and compatibles) and the Ollama generate API

use async_trait::async_trait;
use reqwest::{Client, header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE}};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};
use utoipa::ToSchema;

use crate::chain::render_transcript;
use crate::config::{BackendConfig, ProtocolType};
use crate::error::{AppError, Result};

/// Chat message exchanged with backends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            name: None,
        }
    }
}

/// Chat completion request (OpenAI compatible)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Chat completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<ChatChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Chat choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    pub index: u32,
    pub message: ChatMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Token usage information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Ollama `/api/generate` request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
}

/// Ollama `/api/generate` response (non-streaming)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub model: String,
    pub response: String,
    #[serde(default)]
    pub done: bool,
}

/// Text backend status
#[derive(Debug, Clone)]
pub struct TextBackendStatus {
    pub name: String,
    pub protocol: String,
    pub base_url: String,
    pub model: String,
    pub enabled: bool,
}

/// Trait for text generation backends
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Get the backend name
    fn name(&self) -> &str;

    /// Get the backend protocol
    fn protocol(&self) -> ProtocolType;

    /// Model requests are sent to
    fn model(&self) -> &str;

    /// Generate the assistant reply to a conversation
    async fn generate(&self, messages: &[ChatMessage]) -> Result<ChatMessage>;

    /// Get status
    fn status(&self) -> TextBackendStatus;
}

/// Connection details shared by the HTTP backends
struct HttpTarget {
    name: String,
    client: Client,
    base_url: String,
    model: String,
    enabled: bool,
    auth_token: Option<String>,
}

impl HttpTarget {
    fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            name: config.name.clone(),
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            enabled: config.enabled,
            auth_token: config.resolve_api_key()?,
        })
    }

    /// Get headers with authentication
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.auth_token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        headers
    }

    /// POST a JSON body and decode a JSON reply, mapping failures to backend errors
    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(backend = %self.name, url = %url, error = %e, "Backend request failed");
                AppError::HttpClient(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::BackendError(format!(
                "Backend '{}' returned {}: {}",
                self.name, status, body
            )));
        }

        response.json::<R>().await.map_err(|e| {
            error!(backend = %self.name, error = %e, "Failed to parse backend response");
            AppError::BackendError(format!("Failed to parse response: {}", e))
        })
    }

    fn status(&self, protocol: ProtocolType) -> TextBackendStatus {
        TextBackendStatus {
            name: self.name.clone(),
            protocol: protocol.to_string(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            enabled: self.enabled,
        }
    }
}

/// OpenAI chat completions backend
pub struct OpenAIChatBackend {
    target: HttpTarget,
}

impl OpenAIChatBackend {
    /// Fails when no API key can be resolved
    pub fn new(config: &BackendConfig) -> Result<Self> {
        Ok(Self {
            target: HttpTarget::new(config)?,
        })
    }
}

#[async_trait]
impl TextBackend for OpenAIChatBackend {
    fn name(&self) -> &str {
        &self.target.name
    }

    fn protocol(&self) -> ProtocolType {
        ProtocolType::OpenAI
    }

    fn model(&self) -> &str {
        &self.target.model
    }

    async fn generate(&self, messages: &[ChatMessage]) -> Result<ChatMessage> {
        debug!(
            backend = %self.target.name,
            model = %self.target.model,
            messages = messages.len(),
            "Sending chat completion request"
        );

        let request = ChatCompletionRequest {
            model: self.target.model.clone(),
            messages: messages.to_vec(),
            temperature: None,
            max_tokens: None,
        };

        let response: ChatCompletionResponse =
            self.target.post_json("/chat/completions", &request).await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| AppError::BackendError("Backend returned no choices".to_string()))
    }

    fn status(&self) -> TextBackendStatus {
        self.target.status(self.protocol())
    }
}

/// Ollama backend; chat turns are flattened into one prompt
pub struct OllamaBackend {
    target: HttpTarget,
}

impl OllamaBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        Ok(Self {
            target: HttpTarget::new(config)?,
        })
    }
}

#[async_trait]
impl TextBackend for OllamaBackend {
    fn name(&self) -> &str {
        &self.target.name
    }

    fn protocol(&self) -> ProtocolType {
        ProtocolType::Ollama
    }

    fn model(&self) -> &str {
        &self.target.model
    }

    async fn generate(&self, messages: &[ChatMessage]) -> Result<ChatMessage> {
        let request = GenerateRequest {
            model: self.target.model.clone(),
            prompt: render_transcript(messages),
            stream: false,
        };

        debug!(
            backend = %self.target.name,
            model = %self.target.model,
            prompt_len = request.prompt.len(),
            "Sending generate request"
        );

        let response: GenerateResponse = self.target.post_json("/api/generate", &request).await?;
        Ok(ChatMessage::new("assistant", response.response))
    }

    fn status(&self) -> TextBackendStatus {
        self.target.status(self.protocol())
    }
}

/// Create appropriate text backend based on configuration
pub fn create_text_backend(config: &BackendConfig) -> Result<Arc<dyn TextBackend>> {
    match config.protocol {
        ProtocolType::OpenAI => Ok(Arc::new(OpenAIChatBackend::new(config)?)),
        ProtocolType::Ollama => Ok(Arc::new(OllamaBackend::new(config)?)),
    }
}
