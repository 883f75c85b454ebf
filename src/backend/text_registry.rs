//! Text backend registry for managing text generation backends

use std::sync::Arc;
use dashmap::DashMap;
use tracing::info;

use crate::backend::text_backend::{TextBackend, TextBackendStatus, create_text_backend};
use crate::config::BackendConfig;
use crate::error::{AppError, Result};

/// Registry for text generation backends
pub struct TextBackendRegistry {
    backends: DashMap<String, Arc<dyn TextBackend>>,
}

impl TextBackendRegistry {
    /// Create a new text backend registry
    pub fn new() -> Self {
        Self {
            backends: DashMap::new(),
        }
    }

    /// Add a backend from configuration
    pub async fn add_backend(&self, config: BackendConfig) -> Result<()> {
        if self.backends.contains_key(&config.name) {
            return Err(AppError::Internal(format!(
                "Backend '{}' is already registered",
                config.name
            )));
        }

        let backend = create_text_backend(&config)?;
        self.register(backend);
        Ok(())
    }

    /// Register an already constructed backend, replacing any with the same name
    pub fn register(&self, backend: Arc<dyn TextBackend>) {
        let name = backend.name().to_string();
        info!(name = %name, protocol = %backend.protocol(), model = %backend.model(), "Text backend registered");
        self.backends.insert(name, backend);
    }

    /// Get a backend by name
    pub async fn get_backend(&self, name: &str) -> Result<Arc<dyn TextBackend>> {
        match self.backends.get(name) {
            Some(backend) if backend.status().enabled => Ok(backend.value().clone()),
            Some(_) => Err(AppError::BackendError(format!("Backend '{}' is disabled", name))),
            None => Err(AppError::BackendNotFound(name.to_string())),
        }
    }

    /// List all backends with status, sorted by name
    pub async fn list_backends(&self) -> Vec<TextBackendStatus> {
        let mut statuses: Vec<TextBackendStatus> = self
            .backends
            .iter()
            .map(|entry| entry.value().status())
            .collect();
        statuses.sort_by(|a, b| a.name.cmp(&b.name));
        statuses
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl Default for TextBackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
