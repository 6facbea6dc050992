use std::sync::Arc;

use shapetree_ecosystem::MetadataEcosystem;
use shapetree_fetch::{CachingFetcher, Fetch, HttpFetcher};
use shapetree_store::StorageRegistry;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::error::ServerResult;
use crate::handler::AppState;
use crate::router::build_router;

/// A ShapeTree-aware LDP server.
pub struct ShapeTreeServer {
    config: ServerConfig,
    state: AppState,
}

impl ShapeTreeServer {
    /// Assemble the server with its own storage registry.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        Self::with_registry(config, &StorageRegistry::new())
    }

    /// Assemble the server, taking its storage from `registry`. Schemas are
    /// fetched over HTTP through the on-disk cache.
    pub fn with_registry(config: ServerConfig, registry: &StorageRegistry) -> ServerResult<Self> {
        let storage = registry.open(&config.storage)?;
        let fetcher = schema_fetcher(&config)?;
        let ecosystem = Arc::new(MetadataEcosystem::new(Arc::clone(&storage)));
        let dispatcher = Dispatcher::new(storage, fetcher, ecosystem);
        Self::from_dispatcher(config, dispatcher)
    }

    /// Use an already assembled dispatcher.
    pub fn from_dispatcher(config: ServerConfig, dispatcher: Dispatcher) -> ServerResult<Self> {
        let state = AppState {
            dispatcher: Arc::new(dispatcher),
            base_url: config.base_url()?,
            storage_kind: config.storage_kind(),
            max_body_bytes: config.max_body_bytes,
        };
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.state.dispatcher
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Create the root container if needed.
    pub async fn prepare(&self) -> ServerResult<()> {
        self.state.dispatcher.ensure_root(&self.state.base_url).await?;
        Ok(())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        self.prepare().await?;
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            base = %self.state.base_url,
            storage = self.state.storage_kind,
            "ShapeTree server listening"
        );
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

/// The fetcher [`ShapeTreeServer::new`] uses, for tools that resolve schemas
/// the same way the server does.
pub fn schema_fetcher(config: &ServerConfig) -> ServerResult<Arc<dyn Fetch>> {
    let fetcher = CachingFetcher::new(HttpFetcher::new()?, config.cache_dir.clone())
        .with_serving_origin(&config.base_url()?);
    Ok(Arc::new(fetcher))
}
