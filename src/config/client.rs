//! Settings for the browser assistant client

use crate::config::settings::{file_format, LoggingConfig, ServerConfig};
use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment prefix for client overrides, e.g. `CHAIN_CLIENT__API_URL=http://gateway:8000`
pub const CLIENT_ENV_PREFIX: &str = "CHAIN_CLIENT";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientSettings {
    #[serde(default = "default_client_server")]
    pub server: ServerConfig,
    /// Base URL of the gateway
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Directory holding the page assets
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_client_server() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 8501,
    }
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_static_dir() -> String {
    "static".to_string()
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server: default_client_server(),
            api_url: default_api_url(),
            static_dir: default_static_dir(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ClientSettings {
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/client.yaml")
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let defaults = default_client_server();

        let mut config_builder = Config::builder()
            .set_default("server.host", defaults.host)?
            .set_default("server.port", i64::from(defaults.port))?
            .set_default("api_url", default_api_url())?
            .set_default("static_dir", default_static_dir())?;

        if path.exists() {
            config_builder = config_builder.add_source(File::from(path).format(file_format(path)));
        }

        config_builder = config_builder.add_source(
            Environment::with_prefix(CLIENT_ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings: ClientSettings = config_builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "Server port cannot be 0".to_string(),
            )));
        }
        reqwest::Url::parse(&self.api_url).map_err(|e| {
            AppError::Config(config::ConfigError::Message(format!(
                "Invalid api_url '{}': {}",
                self.api_url, e
            )))
        })?;
        Ok(())
    }
}
