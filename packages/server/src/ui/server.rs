//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::{
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryRoomDirectory,
        storage::LocalFileStore,
    },
    usecase::BroadcastDispatcher,
};

use super::{
    config::ServerConfig,
    handler::{get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Room-scoped relay server
///
/// Owns the wiring of every collaborator and the single broadcast dispatcher.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(ServerConfig::default());
/// server.run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    state: Arc<AppState>,
    dispatcher: BroadcastDispatcher,
    file_store: Arc<LocalFileStore>,
}

impl Server {
    /// Build the in-memory directory, the WebSocket pusher and the local file
    /// store, and wire them into the use cases.
    pub fn new(config: ServerConfig) -> Self {
        let directory = Arc::new(InMemoryRoomDirectory::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
        let file_store = Arc::new(LocalFileStore::new(config.files_dir.clone()));

        let (state, dispatcher) = AppState::new(
            directory,
            message_pusher,
            file_store.clone(),
            &config.public_url,
        );

        Self {
            config,
            state: Arc::new(state),
            dispatcher,
            file_store,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Axum router with every route of the server.
    pub fn router(&self) -> Router {
        let static_dir = &self.config.static_dir;

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            // 静的ファイルとアップロード済みファイル
            .route_service("/", ServeFile::new(static_dir.join("index.html")))
            .nest_service("/static", ServeDir::new(static_dir))
            .nest_service("/files", ServeDir::new(&self.config.files_dir))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Bind to the configured address and serve until Ctrl+C / SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the files directory cannot be created, the address
    /// cannot be bound, or serving fails.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        self.serve(listener, shutdown_signal()).await?;
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.file_store.ensure_root().await?;
        let app = self.router();

        // The one and only broadcast dispatcher
        let dispatcher = self.dispatcher.spawn();

        let local_addr = listener.local_addr()?;
        tracing::info!("Kangaroo relay listening on {}", local_addr);
        tracing::info!("Connect to: ws://{}/ws", local_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        // Upgraded connections may still hold hub handles, so stop the dispatcher here
        dispatcher.abort();
        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
