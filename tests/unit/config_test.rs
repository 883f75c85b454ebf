//! Unit tests for configuration module

use chain_gateway::config::{BackendConfig, ClientSettings, ProtocolType, RouteConfig, Settings, TemplateTurn};
use std::fs;

fn route(path: &str, backend: &str, template: Option<&str>) -> RouteConfig {
    RouteConfig {
        path: path.to_string(),
        backend: backend.to_string(),
        template: template.map(str::to_string),
        messages: vec![],
    }
}

#[test]
fn test_default_settings() {
    let settings = Settings::default();

    assert_eq!(settings.server.host, "localhost");
    assert_eq!(settings.server.port, 8000);
    assert_eq!(settings.server.address(), "localhost:8000");
    assert_eq!(settings.logging.format, "json");

    let routes: Vec<&str> = settings.routes.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(routes, vec!["openai", "essay", "poem"]);

    let poem = &settings.routes[2];
    assert_eq!(poem.backend, "ollama");
    assert_eq!(poem.template.as_deref(), Some("Write poem on {topic} with 100 words"));
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load_from_path(dir.path().join("absent.yaml")).unwrap();

    assert_eq!(settings.server.port, 8000);
    assert_eq!(settings.backends.len(), 2);
    assert_eq!(settings.routes.len(), 3);
}

#[test]
fn test_load_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gateway.yaml");
    fs::write(
        &path,
        r#"
server:
  host: 0.0.0.0
  port: 9100
logging:
  format: pretty
backends:
  - name: local
    protocol: ollama
    base_url: http://gpu-box:11434
    model: mistral
routes:
  - path: haiku
    backend: local
    template: "Write a haiku about {topic}"
  - path: tutor
    backend: local
    messages:
      - role: system
        content: You are a patient tutor
      - role: human
        content: "Explain {concept}"
"#,
    )
    .unwrap();

    let settings = Settings::load_from_path(&path).unwrap();
    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 9100);
    assert_eq!(settings.logging.format, "pretty");
    assert_eq!(settings.logging.level, "info");

    assert_eq!(settings.backends.len(), 1);
    assert_eq!(settings.backends[0].protocol, ProtocolType::Ollama);
    assert_eq!(settings.backends[0].timeout_ms, 60000);

    assert_eq!(settings.routes.len(), 2);
    assert_eq!(
        settings.routes[1].messages[0],
        TemplateTurn {
            role: "system".to_string(),
            content: "You are a patient tutor".to_string()
        }
    );
    assert!(settings.validate().is_ok());

    let tutor = settings.routes[1].prompt().unwrap().unwrap();
    assert_eq!(tutor.input_variables(), ["concept".to_string()]);
}

#[test]
fn test_validation_invalid_port() {
    let mut settings = Settings::default();
    settings.server.port = 0;
    assert!(settings.validate().is_err());
}

#[test]
fn test_validation_empty_backend_name() {
    let mut settings = Settings::default();
    settings.backends.push(BackendConfig {
        base_url: "http://localhost:1".to_string(),
        ..Default::default()
    });
    assert!(settings.validate().is_err());
}

#[test]
fn test_validation_missing_base_url() {
    let mut settings = Settings::default();
    settings.backends[1].base_url = "  ".to_string();
    assert!(settings.validate().is_err());
}

#[test]
fn test_validation_route_to_unknown_backend() {
    let mut settings = Settings::default();
    settings.routes.push(route("story", "anthropic", Some("Tell a story about {topic}")));
    assert!(settings.validate().is_err());
}

#[test]
fn test_validation_duplicate_route() {
    let mut settings = Settings::default();
    settings.routes.push(route("essay", "ollama", None));
    assert!(settings.validate().is_err());
}

#[test]
fn test_validation_nested_route_path() {
    let mut settings = Settings::default();
    settings.routes.push(route("v2/essay", "openai", None));
    assert!(settings.validate().is_err());
}

#[test]
fn test_validation_reserved_route_paths() {
    for reserved in ["docs", "health", "openapi.json"] {
        let mut settings = Settings::default();
        settings.routes.push(route(reserved, "ollama", Some("Write about {topic}")));
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("reserved"), "{}", err);
    }
}

#[test]
fn test_validation_broken_template() {
    let mut settings = Settings::default();
    settings.routes.push(route("broken", "openai", Some("Write about {topic")));
    assert!(settings.validate().is_err());
}

#[test]
fn test_client_defaults() {
    let settings = ClientSettings::default();
    assert_eq!(settings.api_url, "http://localhost:8000");
    assert_eq!(settings.server.address(), "127.0.0.1:8501");
    assert!(settings.validate().is_ok());
}

#[test]
fn test_client_rejects_bad_api_url() {
    let settings = ClientSettings {
        api_url: "not a url".to_string(),
        ..Default::default()
    };
    assert!(settings.validate().is_err());
}

#[test]
fn test_client_load_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("client.yaml");
    fs::write(&path, "api_url: http://gateway:8000\nserver:\n  port: 9501\n").unwrap();

    let settings = ClientSettings::load_from_path(&path).unwrap();
    assert_eq!(settings.api_url, "http://gateway:8000");
    assert_eq!(settings.server.port, 9501);
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.static_dir, "static");
}
