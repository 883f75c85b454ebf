//! Registry of chains served as forwarders

use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

use crate::backend::TextBackendRegistry;
use crate::chain::runnable::Chain;
use crate::config::RouteConfig;
use crate::error::{AppError, Result};

/// Chains keyed by the path segment they are mounted under
pub struct ChainRegistry {
    chains: DashMap<String, Arc<Chain>>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self {
            chains: DashMap::new(),
        }
    }

    /// Build the chain for a route and register it
    pub async fn add_route(&self, route: &RouteConfig, backends: &TextBackendRegistry) -> Result<()> {
        let backend = backends.get_backend(&route.backend).await?;
        let prompt = route.prompt()?;

        info!(
            path = %route.path,
            backend = %route.backend,
            passthrough = prompt.is_none(),
            "Route registered"
        );

        self.insert(Chain::new(route.path.clone(), prompt, backend));
        Ok(())
    }

    pub fn insert(&self, chain: Chain) {
        self.chains.insert(chain.name().to_string(), Arc::new(chain));
    }

    pub fn get(&self, name: &str) -> Result<Arc<Chain>> {
        self.chains
            .get(name)
            .map(|c| c.value().clone())
            .ok_or_else(|| AppError::RouteNotFound(name.to_string()))
    }

    /// Registered route names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.chains.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::new()
    }
}
