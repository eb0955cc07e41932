//! Server bootstrap: dependency wiring, binding and graceful shutdown

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use tasklens_kb::{
    create_embedding_service, create_state_store, probe_embedding_service, EmbeddingAggregator, EmbeddingGenerator,
    IngestionService, QueryService, StateStore, StateStoreError,
};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub ingestion: IngestionService,
    pub query: QueryService,
    pub store: Arc<dyn StateStore>,
    pub model: String,
}

impl AppState {
    /// Wires the services around an already connected store and generator.
    pub fn new(config: &ServerConfig, store: Arc<dyn StateStore>, generator: Arc<dyn EmbeddingGenerator>) -> Self {
        let model = generator.model_name().to_string();
        let aggregator = EmbeddingAggregator::new(generator, config.chunker).with_concurrency(config.chunk_concurrency);

        Self {
            ingestion: IngestionService::new(Arc::clone(&store), aggregator.clone()),
            query: QueryService::new(Arc::clone(&store), aggregator, config.search),
            store,
            model,
        }
    }

    /// Connects the configured store and embedding backend.
    ///
    /// Both are verified here; any failure means the service must not start.
    pub async fn connect(config: &ServerConfig) -> ServerResult<Self> {
        let store = create_state_store(&config.store).await?;
        let generator = create_embedding_service(config.embedding.clone())?;
        Self::verified(config, store, generator).await
    }

    /// Checks the store and embedding backend before wiring the services.
    ///
    /// An unhealthy store or a failed embedding round trip is fatal.
    pub async fn verified(
        config: &ServerConfig,
        store: Arc<dyn StateStore>,
        generator: Arc<dyn EmbeddingGenerator>,
    ) -> ServerResult<Self> {
        if !store.health_check().await? {
            error!(store_uri = %config.store.uri, "Record store reported unhealthy at startup");
            return Err(ServerError::Store(StateStoreError::ConnectionError(
                "store reported unhealthy".to_string(),
            )));
        }

        let dimensions = probe_embedding_service(generator.as_ref()).await?;
        info!(
            provider = config.embedding.provider_name(),
            model = generator.model_name(),
            dimensions,
            "Embedding backend verified"
        );

        Ok(Self::new(config, store, generator))
    }
}

/// Tasklens HTTP server
pub struct TasklensServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl TasklensServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Binds the listener and serves until Ctrl-C or SIGTERM.
    pub async fn run(self) -> ServerResult<()> {
        info!("Starting Tasklens Server");

        let app = crate::api::build_router(self.state());

        let addr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
