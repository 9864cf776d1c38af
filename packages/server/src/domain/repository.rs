//! Registry abstraction over live client connections.
//!
//! Use cases depend on this trait only; the storage lives in the infrastructure
//! layer.

use async_trait::async_trait;
use kairo_shared::ClientId;

use super::entity::{ClientSender, Connection};

/// Table of live connections keyed by client id.
///
/// Implementations must be safe to call from every connection task at once.
/// Structural changes are mutually exclusive; enumeration works on a snapshot so
/// a slow broadcast never holds the table.
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Insert `connection`, replacing any entry with the same id (last write wins).
    /// Returns the replaced entry.
    async fn put(&self, connection: Connection) -> Option<Connection>;

    /// Remove the entry for `id`, if any.
    async fn remove(&self, id: &ClientId) -> Option<Connection>;

    /// Remove the entry for `id` only while it still writes to `sender`.
    ///
    /// Cleanup after a broken channel uses this so it cannot drop an entry that
    /// a newer LOGIN with the same id installed in the meantime.
    async fn evict(&self, id: &ClientId, sender: &ClientSender) -> Option<Connection>;

    async fn get(&self, id: &ClientId) -> Option<Connection>;

    /// Entries present at call time. Later changes are not reflected.
    async fn snapshot(&self) -> Vec<Connection>;

    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
