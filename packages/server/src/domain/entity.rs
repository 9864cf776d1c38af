//! Core domain models for the chat server.

use kairo_shared::{ClientId, Command, DisplayName, Timestamp};
use tokio::sync::mpsc;

/// Outbound queue of one client connection.
///
/// Each connection has exactly one writer task draining this queue, so writes
/// to a single client never interleave.
pub type ClientSender = mpsc::UnboundedSender<Command>;

/// A logged-in client as seen by the registry.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Identity announced in LOGIN
    pub id: ClientId,
    /// Name shown to other clients
    pub display_name: DisplayName,
    /// Outbound channel to the client
    pub sender: ClientSender,
    /// Timestamp when the LOGIN was processed
    pub connected_at: Timestamp,
}

impl Connection {
    pub fn new(
        id: ClientId,
        display_name: DisplayName,
        sender: ClientSender,
        connected_at: Timestamp,
    ) -> Self {
        Self {
            id,
            display_name,
            sender,
            connected_at,
        }
    }

    /// Whether this entry writes to `sender`.
    pub fn owns(&self, sender: &ClientSender) -> bool {
        self.sender.same_channel(sender)
    }

    /// Queue a command for this client. Fails once the client's writer is gone.
    pub fn deliver(&self, command: Command) -> Result<(), mpsc::error::SendError<Command>> {
        self.sender.send(command)
    }
}
