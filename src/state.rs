use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::store::BookStore;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Book collection handle (shared across requests)
    pub store: Arc<dyn BookStore>,
}

impl ServerState {
    /// Create server state, building the store described by `config.store`.
    pub async fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = config.store.build().await?;
        Ok(Self::with_store(config, store))
    }

    /// Create server state around an existing store handle.
    pub fn with_store(config: ServerConfig, store: Arc<dyn BookStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}
