//! UseCase: 接続断の後始末（暗黙的なログアウト）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectUseCase::execute() メソッド
//! - 読み取りループ終了時のエントリ削除と退出通知
//!
//! ### なぜこのテストが必要か
//! - LOGOUT を送らずに消えたクライアントのエントリが残らないことを保証
//! - 同じ ID で後からログインした別の接続のエントリを消さないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：ログイン済み接続の切断
//! - エッジケース：未ログイン・ログアウト済みの接続の切断、ID の重複

use std::sync::Arc;

use super::{Broadcaster, ConnectionContext};
use crate::domain::{Connection, ConnectionRegistry};

/// 接続断のユースケース
pub struct DisconnectUseCase {
    /// Repository（データアクセス層の抽象化）
    registry: Arc<dyn ConnectionRegistry>,
    broadcaster: Broadcaster,
}

impl DisconnectUseCase {
    /// 新しい DisconnectUseCase を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self {
            broadcaster: Broadcaster::new(registry.clone()),
            registry,
        }
    }

    /// 接続断を処理する
    ///
    /// # Returns
    ///
    /// * `Some(Connection)` - 削除されたエントリ（残りの参加者へ通知済み）
    /// * `None` - この接続に対応するエントリがなかった
    pub async fn execute(&self, context: &ConnectionContext) -> Option<Connection> {
        let id = context.unbind().await?;
        let connection = self.registry.evict(&id, context.sender()).await?;
        tracing::info!(
            "Client '{}' ({}) disconnected without LOGOUT, removed from registry",
            connection.display_name,
            id
        );
        self.broadcaster.announce_departure(connection.clone()).await;
        Some(connection)
    }
}
