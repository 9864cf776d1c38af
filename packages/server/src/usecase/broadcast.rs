//! UseCase: ブロードキャスト（ファンアウト）処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - Broadcaster::broadcast() / announce_departure() メソッド
//! - レジストリのスナップショットに対する送信と、送信失敗時の暗黙的な切断
//!
//! ### なぜこのテストが必要か
//! - 1 人への送信失敗が他の受信者への配送を止めないことを保証
//! - 送信に失敗した受信者がレジストリから取り除かれ、退出が通知されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：全員への配送、除外指定つきの配送
//! - 異常系：一部の受信者のチャンネルが閉じている

use std::sync::Arc;

use kairo_shared::{ClientId, Command, CommandType};

use crate::domain::{Connection, ConnectionRegistry};

/// 登録済みの全接続へコマンドを配送する
#[derive(Clone)]
pub struct Broadcaster {
    /// Repository（データアクセス層の抽象化）
    registry: Arc<dyn ConnectionRegistry>,
}

impl Broadcaster {
    /// 新しい Broadcaster を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// `command` を登録済みの全接続（`exclude` を除く）へ送信する
    ///
    /// 送信は受信者ごとのベストエフォートで、失敗した受信者はレジストリから
    /// 取り除かれ、残りの参加者へ LOGOUT が通知されます。
    ///
    /// # Returns
    ///
    /// `command` を受け取れた受信者の数
    pub async fn broadcast(&self, command: &Command, exclude: Option<&ClientId>) -> usize {
        let mut delivered = 0;
        let mut departed = Vec::new();

        for connection in self.registry.snapshot().await {
            if exclude == Some(&connection.id) {
                continue;
            }
            if connection.deliver(command.clone()).is_ok() {
                delivered += 1;
            } else {
                departed.extend(self.evict(&connection).await);
            }
        }

        self.announce_departures(departed).await;
        delivered
    }

    /// `connection` の退出を残りの参加者へ通知する
    pub async fn announce_departure(&self, connection: Connection) {
        self.announce_departures(vec![connection]).await;
    }

    async fn announce_departures(&self, mut departed: Vec<Connection>) {
        // 通知中に見つかった切断はキューに積み、再帰せずに順に処理する
        while let Some(gone) = departed.pop() {
            let notice = Command::new(CommandType::Logout, gone.display_name.as_str());
            for connection in self.registry.snapshot().await {
                if connection.deliver(notice.clone()).is_err() {
                    departed.extend(self.evict(&connection).await);
                }
            }
            tracing::info!(
                "Announced departure of '{}' ({})",
                gone.display_name,
                gone.id
            );
        }
    }

    async fn evict(&self, connection: &Connection) -> Option<Connection> {
        let evicted = self
            .registry
            .evict(&connection.id, &connection.sender)
            .await;
        if evicted.is_some() {
            tracing::warn!(
                "Failed to send to client '{}' ({}), removed from registry",
                connection.display_name,
                connection.id
            );
        }
        evicted
    }
}
