//! Gateway endpoint integration tests

#[path = "../common/mod.rs"]
mod common;

use axum::http::StatusCode;
use chain_gateway::config::BackendConfig;
use chain_gateway::{AppError, AppState};
use common::*;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_essay_invoke_fills_prompt() {
    let openai = MockServer::start().await;
    let ollama = MockServer::start().await;
    mock_openai(&openai, "Mars is the fourth planet from the Sun.").await;

    let app = gateway_router(test_settings(&openai.uri(), &ollama.uri())).await;
    let response = app
        .oneshot(post_json("/essay/invoke", json!({"input": {"topic": "Mars"}})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["output"], "Mars is the fourth planet from the Sun.");
    assert!(body["metadata"]["run_id"].is_string());

    let sent = received_bodies(&openai).await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["model"], "gpt-3.5-turbo");
    assert_eq!(
        sent[0]["messages"],
        json!([{"role": "user", "content": "Write essay on Mars with 100 words"}])
    );
}

#[tokio::test]
async fn test_cloud_requests_carry_bearer_key() {
    let openai = MockServer::start().await;
    let ollama = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("ok")))
        .expect(1)
        .mount(&openai)
        .await;

    let app = gateway_router(test_settings(&openai.uri(), &ollama.uri())).await;
    let response = app
        .oneshot(post_json("/essay/invoke", json!({"input": {"topic": "tea"}})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_poem_invoke_uses_local_backend() {
    let openai = MockServer::start().await;
    let ollama = MockServer::start().await;
    mock_ollama(&ollama, "Roses bloom").await;

    let app = gateway_router(test_settings(&openai.uri(), &ollama.uri())).await;
    let response = app
        .oneshot(post_json("/poem/invoke", json!({"input": {"topic": "spring"}})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["output"], "Roses bloom");

    let sent = received_bodies(&ollama).await;
    assert_eq!(
        sent[0],
        json!({"model": "llama3", "prompt": "Human: Write poem on spring with 100 words", "stream": false})
    );
    assert!(received_bodies(&openai).await.is_empty());
}

#[tokio::test]
async fn test_openai_passthrough_accepts_string_and_messages() {
    let openai = MockServer::start().await;
    let ollama = MockServer::start().await;
    mock_openai(&openai, "Hi!").await;

    let app = gateway_router(test_settings(&openai.uri(), &ollama.uri())).await;

    let response = app
        .clone()
        .oneshot(post_json("/openai/invoke", json!({"input": "Say hi"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["output"], "Hi!");

    let messages = json!([
        {"role": "system", "content": "Be terse"},
        {"role": "user", "content": "Say hi"}
    ]);
    let response = app
        .oneshot(post_json("/openai/invoke", json!({"input": messages})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let sent = received_bodies(&openai).await;
    assert_eq!(sent[0]["messages"], json!([{"role": "user", "content": "Say hi"}]));
    assert_eq!(sent[1]["messages"], messages);
}

#[tokio::test]
async fn test_missing_template_variable_is_422() {
    let openai = MockServer::start().await;
    let ollama = MockServer::start().await;

    let app = gateway_router(test_settings(&openai.uri(), &ollama.uri())).await;
    let response = app
        .oneshot(post_json("/essay/invoke", json!({"input": {"subject": "Mars"}})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["code"], 422);
    assert!(body["error"].as_str().unwrap().contains("topic"));
    assert!(received_bodies(&openai).await.is_empty());
}

#[tokio::test]
async fn test_body_without_input_is_rejected() {
    let openai = MockServer::start().await;
    let ollama = MockServer::start().await;

    let app = gateway_router(test_settings(&openai.uri(), &ollama.uri())).await;
    let response = app
        .oneshot(post_json("/essay/invoke", json!({"topic": "Mars"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_truncated_json_body_is_422() {
    let openai = MockServer::start().await;
    let ollama = MockServer::start().await;

    let app = gateway_router(test_settings(&openai.uri(), &ollama.uri())).await;
    let response = app
        .clone()
        .oneshot(post_raw("/essay/invoke", r#"{"input": {"topic": "#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["code"], 422);
    assert!(body["error"].as_str().unwrap().contains("JSON syntax error"));

    let response = app
        .oneshot(post_raw("/essay/batch", r#"{"inputs": [{"topic": "a"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(received_bodies(&openai).await.is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let openai = MockServer::start().await;
    let ollama = MockServer::start().await;

    let app = gateway_router(test_settings(&openai.uri(), &ollama.uri())).await;
    let response = app
        .oneshot(post_json("/haiku/invoke", json!({"input": {"topic": "x"}})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_backend_failure_is_502() {
    let openai = MockServer::start().await;
    let ollama = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&openai)
        .await;

    let app = gateway_router(test_settings(&openai.uri(), &ollama.uri())).await;
    let response = app
        .oneshot(post_json("/essay/invoke", json!({"input": {"topic": "Mars"}})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("upstream exploded"));
}

#[tokio::test]
async fn test_unreachable_backend_is_502() {
    let ollama = MockServer::start().await;

    let app = gateway_router(test_settings(&closed_port_url(), &ollama.uri())).await;
    let response = app
        .oneshot(post_json("/essay/invoke", json!({"input": {"topic": "Mars"}})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_batch_preserves_order() {
    let openai = MockServer::start().await;
    let ollama = MockServer::start().await;
    mock_ollama(&ollama, "verse").await;

    let app = gateway_router(test_settings(&openai.uri(), &ollama.uri())).await;
    let response = app
        .oneshot(post_json(
            "/poem/batch",
            json!({"inputs": [{"topic": "sea"}, {"topic": "sky"}, {"topic": "sand"}]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["output"], json!(["verse", "verse", "verse"]));
    assert_eq!(body["metadata"]["run_ids"].as_array().unwrap().len(), 3);

    let mut prompts: Vec<String> = received_bodies(&ollama)
        .await
        .iter()
        .map(|b| b["prompt"].as_str().unwrap().to_string())
        .collect();
    prompts.sort();
    assert_eq!(
        prompts,
        vec![
            "Human: Write poem on sand with 100 words",
            "Human: Write poem on sea with 100 words",
            "Human: Write poem on sky with 100 words",
        ]
    );
}

#[tokio::test]
async fn test_schemas() {
    let openai = MockServer::start().await;
    let ollama = MockServer::start().await;

    let app = gateway_router(test_settings(&openai.uri(), &ollama.uri())).await;

    let response = app.clone().oneshot(get("/essay/input_schema")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let schema = json_body(response).await;
    assert_eq!(schema["required"], json!(["topic"]));

    let response = app.clone().oneshot(get("/poem/output_schema")).await.unwrap();
    assert_eq!(json_body(response).await, json!({"title": "PoemOutput", "type": "string"}));

    let response = app.oneshot(get("/openai/input_schema")).await.unwrap();
    assert!(json_body(response).await["anyOf"].is_array());
}

#[tokio::test]
async fn test_health_lists_routes_and_backends() {
    let openai = MockServer::start().await;
    let ollama = MockServer::start().await;

    let app = gateway_router(test_settings(&openai.uri(), &ollama.uri())).await;
    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["title"], "Langchain-based-project Server");

    let routes: Vec<&str> = body["routes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["path"].as_str().unwrap())
        .collect();
    assert_eq!(routes, vec!["essay", "openai", "poem"]);
    assert_eq!(body["backends"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let openai = MockServer::start().await;
    let ollama = MockServer::start().await;

    let app = gateway_router(test_settings(&openai.uri(), &ollama.uri())).await;
    let response = app.oneshot(get("/openapi.json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let doc = json_body(response).await;
    assert_eq!(doc["info"]["title"], "Langchain-based-project Server");
    assert!(doc["paths"]["/{name}/invoke"].is_object());
}

#[tokio::test]
async fn test_missing_api_key_fails_fast() {
    let ollama = MockServer::start().await;
    let mut settings = test_settings("http://127.0.0.1:9", &ollama.uri());
    let cloud = settings.backends[0].clone();
    settings.backends[0] = BackendConfig {
        api_key: None,
        api_key_env: Some("CHAIN_GATEWAY_TEST_KEY_THAT_IS_NEVER_SET".to_string()),
        ..cloud
    };

    let err = AppState::from_settings(settings).await.err().unwrap();
    assert!(matches!(err, AppError::MissingApiKey { ref backend, .. } if backend == "openai"));
}

#[tokio::test]
async fn test_route_to_unknown_backend_is_rejected() {
    let mut settings = test_settings("http://127.0.0.1:9", "http://127.0.0.1:9");
    settings.routes.push(route("story", "anthropic", Some("Tell a story about {topic}")));

    assert!(AppState::from_settings(settings).await.is_err());
}
