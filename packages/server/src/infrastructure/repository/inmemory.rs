//! InMemory ConnectionRegistry 実装
//!
//! ドメイン層が定義する ConnectionRegistry trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ロックは構造の変更（put / remove / evict）とスナップショットの複製の間だけ保持し、
//! ブロードキャスト中の送信はロックの外で行われます。

use std::collections::HashMap;

use async_trait::async_trait;
use kairo_shared::ClientId;
use tokio::sync::Mutex;

use crate::domain::{ClientSender, Connection, ConnectionRegistry};

/// インメモリ ConnectionRegistry 実装
#[derive(Default)]
pub struct InMemoryConnectionRegistry {
    /// 接続中のクライアント（送信チャンネルを含む）
    connections: Mutex<HashMap<ClientId, Connection>>,
}

impl InMemoryConnectionRegistry {
    /// 新しい InMemoryConnectionRegistry を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn put(&self, connection: Connection) -> Option<Connection> {
        let mut connections = self.connections.lock().await;
        connections.insert(connection.id.clone(), connection)
    }

    async fn remove(&self, id: &ClientId) -> Option<Connection> {
        let mut connections = self.connections.lock().await;
        connections.remove(id)
    }

    async fn evict(&self, id: &ClientId, sender: &ClientSender) -> Option<Connection> {
        let mut connections = self.connections.lock().await;
        if connections.get(id).is_some_and(|c| c.owns(sender)) {
            connections.remove(id)
        } else {
            None
        }
    }

    async fn get(&self, id: &ClientId) -> Option<Connection> {
        let connections = self.connections.lock().await;
        connections.get(id).cloned()
    }

    async fn snapshot(&self) -> Vec<Connection> {
        let connections = self.connections.lock().await;
        connections.values().cloned().collect()
    }

    async fn len(&self) -> usize {
        let connections = self.connections.lock().await;
        connections.len()
    }
}
