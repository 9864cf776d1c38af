//! UseCase: MESSAGE コマンド処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - MessageHandler::handle() メソッド
//! - エコーポリシーに従ったブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 送信者以外の全員にちょうど 1 通ずつ、送信順に届くことを保証
//! - ペイロードが加工されずに中継されることを確認
//! - 送信者名を詐称したメッセージや、レジストリから外れた接続のメッセージが中継されないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：echo-sender / skip-sender それぞれでの配送
//! - 異常系：未ログインの接続からの MESSAGE、形式不正なペイロード、
//!   ログイン名と異なる送信者名、エントリを失った接続からの MESSAGE

use std::sync::Arc;

use async_trait::async_trait;
use kairo_shared::{Command, CommandHandler, CommandType, HandlerError};

use super::{Broadcaster, ConnectionContext};
use crate::{config::EchoPolicy, domain::ConnectionRegistry};

/// MESSAGE コマンドのハンドラ
pub struct MessageHandler {
    /// Repository（データアクセス層の抽象化）
    registry: Arc<dyn ConnectionRegistry>,
    broadcaster: Broadcaster,
    echo_policy: EchoPolicy,
}

impl MessageHandler {
    /// 新しい MessageHandler を作成
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        broadcaster: Broadcaster,
        echo_policy: EchoPolicy,
    ) -> Self {
        Self {
            registry,
            broadcaster,
            echo_policy,
        }
    }
}

#[async_trait]
impl CommandHandler<ConnectionContext> for MessageHandler {
    fn supports(&self, command_type: CommandType) -> bool {
        command_type == CommandType::Message
    }

    async fn handle(
        &self,
        command: &Command,
        context: &ConnectionContext,
    ) -> Result<(), HandlerError> {
        let Some(sender_id) = context.bound_id().await else {
            tracing::warn!("MESSAGE from a connection that has not logged in, dropping it");
            return Ok(());
        };
        let Some(entry) = self
            .registry
            .get(&sender_id)
            .await
            .filter(|entry| entry.owns(context.sender()))
        else {
            tracing::warn!(
                "MESSAGE from '{}' whose registry entry is gone, dropping it",
                sender_id
            );
            return Ok(());
        };
        let Some((name, text)) = command.message_parts() else {
            tracing::warn!(
                "Malformed MESSAGE payload from '{}': {:?}",
                sender_id,
                command.payload()
            );
            return Ok(());
        };
        if name != entry.display_name.as_str() {
            tracing::warn!(
                "MESSAGE from '{}' ({}) signed as '{}', dropping it",
                entry.display_name,
                sender_id,
                name
            );
            return Ok(());
        }
        tracing::info!("Broadcasting message from '{}' ({}): {}", name, sender_id, text);

        let exclude = match self.echo_policy {
            EchoPolicy::EchoSender => None,
            EchoPolicy::SkipSender => Some(&sender_id),
        };
        let delivered = self
            .broadcaster
            .broadcast(&command.without_id(), exclude)
            .await;
        tracing::debug!("Message from '{}' delivered to {} client(s)", sender_id, delivered);

        Ok(())
    }
}
