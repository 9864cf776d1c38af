//! Server startup.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    handler::{health_check, list_connections, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};
use crate::{config::ServerConfig, domain::ConnectionRegistry, error::ServerError};

/// The chat server: one registry, one dispatcher, one read loop per connection.
pub struct ChatServer {
    state: Arc<AppState>,
}

impl ChatServer {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            state: Arc::new(AppState::new(config)),
        }
    }

    /// Handle on the live connection table.
    pub fn registry(&self) -> Arc<dyn ConnectionRegistry> {
        self.state.registry.clone()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/ws", get(websocket_handler))
            .route("/api/health", get(health_check))
            .route("/api/connections", get(list_connections))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!("Listening on ws://{}/ws", addr);
        }
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

/// Bind the configured address and serve until Ctrl-C / SIGTERM.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    tracing::info!("Echo policy: {:?}", config.echo_policy);

    ChatServer::new(&config)
        .serve(listener, shutdown_signal())
        .await
}
