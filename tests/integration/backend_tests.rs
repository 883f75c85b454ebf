//! Backend integration tests

#[path = "../common/mod.rs"]
mod common;

use chain_gateway::backend::{ChatMessage, OllamaBackend, OpenAIChatBackend, TextBackend, TextBackendRegistry};
use chain_gateway::config::{BackendConfig, ProtocolType};
use chain_gateway::AppError;
use common::*;
use serde_json::json;
use tokio_test::assert_ok;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cloud_config(base_url: &str) -> BackendConfig {
    BackendConfig {
        name: "openai".to_string(),
        protocol: ProtocolType::OpenAI,
        base_url: base_url.to_string(),
        model: "gpt-3.5-turbo".to_string(),
        api_key: Some(TEST_API_KEY.to_string()),
        timeout_ms: 5000,
        ..Default::default()
    }
}

fn local_config(base_url: &str) -> BackendConfig {
    BackendConfig {
        name: "ollama".to_string(),
        protocol: ProtocolType::Ollama,
        base_url: base_url.to_string(),
        model: "llama3".to_string(),
        timeout_ms: 5000,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_chat_backend_returns_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_json(json!({
            "model": "gpt-3.5-turbo",
            "messages": [{"role": "user", "content": "hello"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("hi")))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OpenAIChatBackend::new(&cloud_config(&server.uri())).unwrap();
    let reply = backend.generate(&[ChatMessage::new("user", "hello")]).await.unwrap();

    assert_eq!(reply.role, "assistant");
    assert_eq!(reply.content, "hi");
}

#[tokio::test]
async fn test_chat_backend_without_choices_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "x", "model": "m", "choices": []})))
        .mount(&server)
        .await;

    let backend = OpenAIChatBackend::new(&cloud_config(&server.uri())).unwrap();
    let err = backend.generate(&[ChatMessage::new("user", "hello")]).await.unwrap_err();
    assert!(matches!(err, AppError::BackendError(_)));
}

#[tokio::test]
async fn test_ollama_backend_flattens_conversation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_json(json!({
            "model": "llama3",
            "prompt": "System: Be kind\nHuman: Question:Why is the sky blue?",
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(generate_reply("Rayleigh scattering.")))
        .expect(1)
        .mount(&server)
        .await;

    let backend = OllamaBackend::new(&local_config(&server.uri())).unwrap();
    let reply = backend
        .generate(&[
            ChatMessage::new("system", "Be kind"),
            ChatMessage::new("user", "Question:Why is the sky blue?"),
        ])
        .await
        .unwrap();

    assert_eq!(reply.content, "Rayleigh scattering.");
}

#[tokio::test]
async fn test_backend_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model 'llama3' not found"))
        .mount(&server)
        .await;

    let backend = OllamaBackend::new(&local_config(&server.uri())).unwrap();
    let err = backend.generate(&[ChatMessage::new("user", "x")]).await.unwrap_err();

    assert!(matches!(err, AppError::BackendError(ref msg) if msg.contains("model 'llama3' not found")));
}

#[tokio::test]
async fn test_registry_add_and_get() {
    let registry = TextBackendRegistry::new();
    assert!(registry.is_empty());

    assert_ok!(registry.add_backend(local_config("http://localhost:11434")).await);
    assert_eq!(registry.len(), 1);

    let backend = registry.get_backend("ollama").await.unwrap();
    assert_eq!(backend.model(), "llama3");
    assert_eq!(backend.protocol(), ProtocolType::Ollama);
}

#[tokio::test]
async fn test_registry_rejects_duplicates() {
    let registry = TextBackendRegistry::new();
    let config = local_config("http://localhost:11434");

    registry.add_backend(config.clone()).await.unwrap();
    assert!(registry.add_backend(config).await.is_err());
}

#[tokio::test]
async fn test_registry_unknown_and_disabled_backends() {
    let registry = TextBackendRegistry::new();
    let disabled = BackendConfig {
        enabled: false,
        ..local_config("http://localhost:11434")
    };
    registry.add_backend(disabled).await.unwrap();

    assert!(matches!(
        registry.get_backend("missing").await.err().unwrap(),
        AppError::BackendNotFound(_)
    ));
    assert!(registry.get_backend("ollama").await.is_err());

    let statuses = registry.list_backends().await;
    assert_eq!(statuses.len(), 1);
    assert!(!statuses[0].enabled);
}
