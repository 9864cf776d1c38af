//! UseCase: LOGIN コマンド処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LoginHandler::handle() メソッド
//! - 接続の登録、ログイン通知のブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - レジストリに (id → チャンネル, 表示名) が登録されることを保証
//! - 新規参加者自身にも LOGIN 通知が届くこと（暗黙のログイン確認）を確認
//! - ID の重複は後勝ちで上書きされ、エントリが 1 件に保たれることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規ログイン
//! - エッジケース：ID の重複、同じ接続からの再ログイン
//! - 異常系：ID なし・不正な表示名の LOGIN、送信チャンネルが閉じた接続

use std::sync::Arc;

use async_trait::async_trait;
use kairo_shared::{Command, CommandHandler, CommandType, DisplayName, HandlerError, Timestamp};

use super::{Broadcaster, ConnectionContext};
use crate::domain::{Connection, ConnectionRegistry};

/// LOGIN コマンドのハンドラ
pub struct LoginHandler {
    /// Repository（データアクセス層の抽象化）
    registry: Arc<dyn ConnectionRegistry>,
    broadcaster: Broadcaster,
}

impl LoginHandler {
    /// 新しい LoginHandler を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>, broadcaster: Broadcaster) -> Self {
        Self {
            registry,
            broadcaster,
        }
    }
}

#[async_trait]
impl CommandHandler<ConnectionContext> for LoginHandler {
    fn supports(&self, command_type: CommandType) -> bool {
        command_type == CommandType::Login
    }

    /// ログインを実行
    ///
    /// 1. 接続とレジストリのエントリを対応付ける（同じ接続の以前の ID は解放）
    /// 2. レジストリに登録（ID の重複は後勝ち）
    /// 3. 新規参加者を含む全員に LOGIN を通知
    async fn handle(
        &self,
        command: &Command,
        context: &ConnectionContext,
    ) -> Result<(), HandlerError> {
        let Some(id) = command.id().cloned() else {
            tracing::warn!("LOGIN without id, dropping it");
            return Ok(());
        };
        let display_name = match DisplayName::try_from(command.payload().to_string()) {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!("LOGIN from '{}' with invalid name: {}", id, e);
                return Ok(());
            }
        };
        if context.sender().is_closed() {
            return Err(HandlerError::ChannelClosed);
        }

        // 1. 1 つの接続が持つエントリは高々 1 件
        if let Some(previous) = context.bind(id.clone()).await
            && previous != id
            && let Some(stale) = self.registry.evict(&previous, context.sender()).await
        {
            tracing::info!("Connection re-logged in, releasing '{}'", previous);
            self.broadcaster.announce_departure(stale).await;
        }

        // 2. 登録
        let connection = Connection::new(
            id.clone(),
            display_name.clone(),
            context.sender().clone(),
            Timestamp::now(),
        );
        if let Some(replaced) = self.registry.put(connection).await
            && !replaced.owns(context.sender())
        {
            tracing::warn!(
                "Client id '{}' was already registered, replacing the previous connection",
                id
            );
        }
        tracing::info!("Client '{}' logged in as '{}'", id, display_name);

        // 3. 通知（ID は他のクライアントに渡さない）
        self.broadcaster.broadcast(&command.without_id(), None).await;

        Ok(())
    }
}
