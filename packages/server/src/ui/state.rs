//! Server state shared by every request handler.

use std::sync::Arc;

use kairo_shared::CommandDispatcher;

use crate::{
    config::ServerConfig,
    domain::ConnectionRegistry,
    infrastructure::repository::InMemoryConnectionRegistry,
    usecase::{ConnectionContext, DisconnectUseCase, build_dispatcher},
};

/// Shared application state
pub struct AppState {
    /// Repository（データアクセス層の抽象化）
    pub registry: Arc<dyn ConnectionRegistry>,
    /// Server-side handlers for LOGIN / LOGOUT / MESSAGE
    pub dispatcher: CommandDispatcher<ConnectionContext>,
    /// Cleanup run when a connection's read loop ends
    pub disconnect: DisconnectUseCase,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        let registry: Arc<dyn ConnectionRegistry> = Arc::new(InMemoryConnectionRegistry::new());
        Self {
            dispatcher: build_dispatcher(registry.clone(), config.echo_policy),
            disconnect: DisconnectUseCase::new(registry.clone()),
            registry,
        }
    }
}
