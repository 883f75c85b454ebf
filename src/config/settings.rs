//! Gateway settings and configuration management

use crate::chain::ChatPromptTemplate;
use crate::error::{AppError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Environment prefix for gateway overrides, e.g. `CHAIN_GATEWAY__SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "CHAIN_GATEWAY";

/// Default variable holding the cloud API key
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// First path segments served by the gateway itself
pub const RESERVED_ROUTE_PATHS: &[&str] = &["docs", "health", "openapi.json"];

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub app: AppInfo,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "default_backends")]
    pub backends: Vec<BackendConfig>,
    #[serde(default = "default_routes")]
    pub routes: Vec<RouteConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Metadata published in the OpenAPI document and the health endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppInfo {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_description")]
    pub description: String,
}

fn default_title() -> String {
    "Langchain-based-project Server".to_string()
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_description() -> String {
    "Prompt chains served over HTTP".to_string()
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            title: default_title(),
            version: default_version(),
            description: default_description(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Wire protocol spoken by a backend
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolType {
    /// Chat completions API (`/chat/completions`)
    OpenAI,
    /// Local model server (`/api/generate`)
    Ollama,
}

impl Default for ProtocolType {
    fn default() -> Self {
        ProtocolType::OpenAI
    }
}

impl std::fmt::Display for ProtocolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolType::OpenAI => write!(f, "openai"),
            ProtocolType::Ollama => write!(f, "ollama"),
        }
    }
}

/// Backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    pub name: String,

    #[serde(default)]
    pub protocol: ProtocolType,

    pub base_url: String,

    pub model: String,

    /// Literal API key; takes precedence over `api_key_env`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Environment variable to read the API key from
    #[serde(default)]
    pub api_key_env: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_timeout() -> u64 {
    60000
}

fn default_true() -> bool {
    true
}

impl BackendConfig {
    /// Resolve the API key for this backend.
    ///
    /// Cloud backends must end up with a key; local backends may run without one.
    pub fn resolve_api_key(&self) -> Result<Option<String>> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Ok(Some(key.clone()));
        }

        let env_name = match (&self.api_key_env, self.protocol) {
            (Some(name), _) => name.clone(),
            (None, ProtocolType::OpenAI) => DEFAULT_API_KEY_ENV.to_string(),
            (None, ProtocolType::Ollama) => return Ok(None),
        };

        match std::env::var(&env_name) {
            Ok(key) if !key.trim().is_empty() => Ok(Some(key)),
            _ if self.protocol == ProtocolType::OpenAI => Err(AppError::MissingApiKey {
                backend: self.name.clone(),
                env: env_name,
            }),
            _ => Ok(None),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            protocol: ProtocolType::default(),
            base_url: String::new(),
            model: String::new(),
            api_key: None,
            api_key_env: None,
            timeout_ms: default_timeout(),
            enabled: true,
        }
    }
}

/// One `(role, content)` turn of a route template
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TemplateTurn {
    pub role: String,
    pub content: String,
}

/// A forwarder mounted at `/{path}/...`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    pub path: String,

    pub backend: String,

    /// Single user-turn template, e.g. `Write essay on {topic} with 100 words`
    #[serde(default)]
    pub template: Option<String>,

    /// Multi-turn template; used when `template` is not set
    #[serde(default)]
    pub messages: Vec<TemplateTurn>,
}

impl RouteConfig {
    /// Build the prompt template for this route, `None` for a passthrough route
    pub fn prompt(&self) -> Result<Option<ChatPromptTemplate>> {
        if let Some(template) = &self.template {
            return ChatPromptTemplate::from_template(template).map(Some);
        }
        if self.messages.is_empty() {
            return Ok(None);
        }
        let turns = self
            .messages
            .iter()
            .map(|t| (t.role.as_str(), t.content.as_str()));
        ChatPromptTemplate::from_messages(turns).map(Some)
    }
}

fn default_backends() -> Vec<BackendConfig> {
    vec![
        BackendConfig {
            name: "openai".to_string(),
            protocol: ProtocolType::OpenAI,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key_env: Some(DEFAULT_API_KEY_ENV.to_string()),
            ..Default::default()
        },
        BackendConfig {
            name: "ollama".to_string(),
            protocol: ProtocolType::Ollama,
            base_url: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            ..Default::default()
        },
    ]
}

fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig {
            path: "openai".to_string(),
            backend: "openai".to_string(),
            template: None,
            messages: vec![],
        },
        RouteConfig {
            path: "essay".to_string(),
            backend: "openai".to_string(),
            template: Some("Write essay on {topic} with 100 words".to_string()),
            messages: vec![],
        },
        RouteConfig {
            path: "poem".to_string(),
            backend: "ollama".to_string(),
            template: Some("Write poem on {topic} with 100 words".to_string()),
            messages: vec![],
        },
    ]
}

/// Pick the config file format from the extension, YAML unless it says TOML
pub(crate) fn file_format(path: &Path) -> FileFormat {
    if path.extension().map_or(false, |ext| ext == "toml") {
        FileFormat::Toml
    } else {
        FileFormat::Yaml
    }
}

impl Settings {
    /// Load settings from `config/gateway.yaml` and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/gateway.yaml")
    }

    /// Load settings from a specific configuration file; a missing file means defaults
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut config_builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?;

        if path.exists() {
            config_builder = config_builder.add_source(File::from(path).format(file_format(path)));
        }

        config_builder = config_builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = config_builder.build()?;
        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "Server port cannot be 0".to_string(),
            )));
        }

        let mut names = HashSet::new();
        for backend in &self.backends {
            if backend.name.is_empty() {
                return Err(AppError::Config(config::ConfigError::Message(
                    "Backend name cannot be empty".to_string(),
                )));
            }
            if backend.base_url.trim().is_empty() {
                return Err(AppError::Config(config::ConfigError::Message(format!(
                    "Backend '{}' must have a base_url",
                    backend.name
                ))));
            }
            if !names.insert(backend.name.as_str()) {
                return Err(AppError::Config(config::ConfigError::Message(format!(
                    "Backend '{}' is defined twice",
                    backend.name
                ))));
            }
        }

        let mut paths = HashSet::new();
        for route in &self.routes {
            if route.path.is_empty() || route.path.contains('/') {
                return Err(AppError::Config(config::ConfigError::Message(format!(
                    "Route path '{}' must be a single non-empty segment",
                    route.path
                ))));
            }
            if RESERVED_ROUTE_PATHS.contains(&route.path.as_str()) {
                return Err(AppError::Config(config::ConfigError::Message(format!(
                    "Route path '{}' is reserved by the gateway",
                    route.path
                ))));
            }
            if !paths.insert(route.path.as_str()) {
                return Err(AppError::Config(config::ConfigError::Message(format!(
                    "Route '{}' is defined twice",
                    route.path
                ))));
            }
            if !names.contains(route.backend.as_str()) {
                return Err(AppError::Config(config::ConfigError::Message(format!(
                    "Route '{}' points at unknown backend '{}'",
                    route.path, route.backend
                ))));
            }
            route.prompt()?;
        }

        Ok(())
    }

    /// Get enabled backends
    pub fn get_enabled_backends(&self) -> Vec<&BackendConfig> {
        self.backends.iter().filter(|b| b.enabled).collect()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            app: AppInfo::default(),
            logging: LoggingConfig::default(),
            backends: default_backends(),
            routes: default_routes(),
        }
    }
}
