//! UseCase: LOGOUT コマンド処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LogoutHandler::handle() メソッド
//! - エントリの削除、送信元への確認応答、残りの参加者への通知
//!
//! ### なぜこのテストが必要か
//! - LOGOUT 後にレジストリへ ID が残らないことを保証
//! - クライアントは確認応答を待ってからチャンネルを閉じるため、応答が必ず返ることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：ログイン済みクライアントのログアウト
//! - エッジケース：登録されていない ID の LOGOUT（何もしない）
//! - 異常系：ID なしの LOGOUT、他の接続がログインした ID の LOGOUT

use std::sync::Arc;

use async_trait::async_trait;
use kairo_shared::{Command, CommandHandler, CommandType, HandlerError};

use super::{Broadcaster, ConnectionContext};
use crate::domain::ConnectionRegistry;

/// LOGOUT コマンドのハンドラ
pub struct LogoutHandler {
    /// Repository（データアクセス層の抽象化）
    registry: Arc<dyn ConnectionRegistry>,
    broadcaster: Broadcaster,
}

impl LogoutHandler {
    /// 新しい LogoutHandler を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>, broadcaster: Broadcaster) -> Self {
        Self {
            registry,
            broadcaster,
        }
    }
}

#[async_trait]
impl CommandHandler<ConnectionContext> for LogoutHandler {
    fn supports(&self, command_type: CommandType) -> bool {
        command_type == CommandType::Logout
    }

    /// ログアウトを実行
    ///
    /// 1. この接続自身がログインした ID であればレジストリから削除
    ///    （他の接続の ID や存在しない ID は何もしない）
    /// 2. 送信元へ確認応答（同じ ID を持つ LOGOUT）を返す
    /// 3. 削除された場合は残りの参加者へ LOGOUT を通知
    async fn handle(
        &self,
        command: &Command,
        context: &ConnectionContext,
    ) -> Result<(), HandlerError> {
        let Some(id) = command.id() else {
            tracing::warn!("LOGOUT without id, dropping it");
            return Ok(());
        };

        // 1. 削除（エントリがこの接続のものである場合のみ）
        let removed = if context.bound_id().await.as_ref() == Some(id) {
            context.unbind().await;
            self.registry.evict(id, context.sender()).await
        } else {
            tracing::warn!("LOGOUT for '{}' from a connection not logged in as it", id);
            None
        };

        // 2. 確認応答
        let acknowledged = context.sender().send(command.clone()).is_ok();

        // 3. 通知
        match removed {
            Some(connection) => {
                tracing::info!("Client '{}' ({}) logged out", connection.display_name, id);
                self.broadcaster.announce_departure(connection).await;
            }
            None => {
                tracing::debug!("LOGOUT for '{}' removed nothing", id);
            }
        }

        if acknowledged {
            Ok(())
        } else {
            Err(HandlerError::ChannelClosed)
        }
    }
}
