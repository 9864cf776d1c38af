//! UseCase 層
//!
//! サーバー側のコマンドハンドラを実装するレイヤー。
//! UI 層の読み取りループから CommandDispatcher 経由で呼び出され、
//! Domain 層の ConnectionRegistry を操作します。

pub mod broadcast;
pub mod context;
pub mod disconnect;
pub mod login;
pub mod logout;
pub mod message;

use std::sync::Arc;

use kairo_shared::CommandDispatcher;

use crate::{config::EchoPolicy, domain::ConnectionRegistry};

pub use broadcast::Broadcaster;
pub use context::ConnectionContext;
pub use disconnect::DisconnectUseCase;
pub use login::LoginHandler;
pub use logout::LogoutHandler;
pub use message::MessageHandler;

/// サーバー側の CommandDispatcher を構築する（コンポジションルート）
///
/// ハンドラは起動時に一度だけ登録され、以後追加・削除されません。
pub fn build_dispatcher(
    registry: Arc<dyn ConnectionRegistry>,
    echo_policy: EchoPolicy,
) -> CommandDispatcher<ConnectionContext> {
    let broadcaster = Broadcaster::new(registry.clone());
    let mut dispatcher = CommandDispatcher::new();
    dispatcher
        .register(LoginHandler::new(registry.clone(), broadcaster.clone()))
        .register(LogoutHandler::new(registry.clone(), broadcaster.clone()))
        .register(MessageHandler::new(registry, broadcaster, echo_policy));
    dispatcher
}
