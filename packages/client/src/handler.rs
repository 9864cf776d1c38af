//! Client-side command handlers.
//!
//! Inbound commands are turned into [`SessionEvent`]s. The handlers need no
//! per-connection state, so their dispatch context is `()`.

use std::sync::Arc;

use async_trait::async_trait;
use kairo_shared::{Command, CommandDispatcher, CommandHandler, CommandType, HandlerError};

use crate::event::{EventNotifier, SessionEvent};

/// Sender name shown when a MESSAGE payload has no `name: ` prefix.
const UNKNOWN_SENDER: &str = "unknown";

/// LOGIN received: someone joined.
pub struct ClientLoginHandler {
    notifier: Arc<dyn EventNotifier>,
}

impl ClientLoginHandler {
    pub fn new(notifier: Arc<dyn EventNotifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl CommandHandler<()> for ClientLoginHandler {
    fn supports(&self, command_type: CommandType) -> bool {
        command_type == CommandType::Login
    }

    async fn handle(&self, command: &Command, _: &()) -> Result<(), HandlerError> {
        self.notifier.publish(SessionEvent::Joined {
            display_name: command.payload().to_string(),
        });
        Ok(())
    }
}

/// LOGOUT received: someone left.
pub struct ClientLogoutHandler {
    notifier: Arc<dyn EventNotifier>,
}

impl ClientLogoutHandler {
    pub fn new(notifier: Arc<dyn EventNotifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl CommandHandler<()> for ClientLogoutHandler {
    fn supports(&self, command_type: CommandType) -> bool {
        command_type == CommandType::Logout
    }

    async fn handle(&self, command: &Command, _: &()) -> Result<(), HandlerError> {
        self.notifier.publish(SessionEvent::Left {
            display_name: command.payload().to_string(),
        });
        Ok(())
    }
}

/// MESSAGE received: split `name: text` and publish it.
pub struct ClientMessageHandler {
    notifier: Arc<dyn EventNotifier>,
}

impl ClientMessageHandler {
    pub fn new(notifier: Arc<dyn EventNotifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl CommandHandler<()> for ClientMessageHandler {
    fn supports(&self, command_type: CommandType) -> bool {
        command_type == CommandType::Message
    }

    async fn handle(&self, command: &Command, _: &()) -> Result<(), HandlerError> {
        let event = match command.message_parts() {
            Some((sender, text)) => SessionEvent::Message {
                sender: sender.to_string(),
                text: text.to_string(),
            },
            None => {
                tracing::warn!("MESSAGE without sender name: {:?}", command.payload());
                SessionEvent::Message {
                    sender: UNKNOWN_SENDER.to_string(),
                    text: command.payload().to_string(),
                }
            }
        };
        self.notifier.publish(event);
        Ok(())
    }
}

/// Dispatcher with the three client handlers registered.
pub fn build_client_dispatcher(notifier: Arc<dyn EventNotifier>) -> CommandDispatcher<()> {
    let mut dispatcher = CommandDispatcher::new();
    dispatcher
        .register(ClientLoginHandler::new(notifier.clone()))
        .register(ClientLogoutHandler::new(notifier.clone()))
        .register(ClientMessageHandler::new(notifier));
    dispatcher
}
