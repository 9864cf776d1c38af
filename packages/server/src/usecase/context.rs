//! Per-connection context handed to every handler invocation.

use kairo_shared::ClientId;
use tokio::sync::Mutex;

use crate::domain::ClientSender;

/// The connection a command arrived on.
///
/// Holds the connection's outbound channel and the id it logged in with, if
/// any. Commands stay transport-agnostic; the channel reaches handlers only
/// through this context.
pub struct ConnectionContext {
    sender: ClientSender,
    identity: Mutex<Option<ClientId>>,
}

impl ConnectionContext {
    pub fn new(sender: ClientSender) -> Self {
        Self {
            sender,
            identity: Mutex::new(None),
        }
    }

    pub fn sender(&self) -> &ClientSender {
        &self.sender
    }

    /// The id this connection logged in with.
    pub async fn bound_id(&self) -> Option<ClientId> {
        self.identity.lock().await.clone()
    }

    /// Associate `id` with this connection, returning the previous one.
    pub async fn bind(&self, id: ClientId) -> Option<ClientId> {
        self.identity.lock().await.replace(id)
    }

    /// Forget the id associated with this connection.
    pub async fn unbind(&self) -> Option<ClientId> {
        self.identity.lock().await.take()
    }
}
