//! Routing of commands to the handlers registered for their type.
//!
//! Handlers are wired once at startup through [`CommandDispatcher::register`] and
//! form an ordered list of `(supports predicate, handler)` pairs. A dispatch runs
//! every matching handler in registration order on the caller's task. A command
//! no handler supports is dropped silently, which keeps older peers compatible
//! with newer command types.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    command::{Command, CommandType},
    error::HandlerError,
};

/// Unit of behavior bound to a command type.
///
/// `C` is the per-call context supplied by whoever reads the command off the
/// channel, e.g. the originating connection on the server.
#[async_trait]
pub trait CommandHandler<C: Sync>: Send + Sync {
    /// Whether this handler wants commands of `command_type`.
    fn supports(&self, command_type: CommandType) -> bool;

    async fn handle(&self, command: &Command, context: &C) -> Result<(), HandlerError>;
}

/// Registry and router from [`Command`] to [`CommandHandler`]s.
pub struct CommandDispatcher<C> {
    handlers: Vec<Arc<dyn CommandHandler<C>>>,
}

impl<C: Sync> CommandDispatcher<C> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Append a handler. Registration order is dispatch order.
    pub fn register<H>(&mut self, handler: H) -> &mut Self
    where
        H: CommandHandler<C> + 'static,
    {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Deliver `command` to every handler that supports its type.
    ///
    /// Returns how many handlers ran. Handler errors are not caught: the first
    /// failure stops the dispatch and is returned to the caller.
    pub async fn dispatch(&self, command: &Command, context: &C) -> Result<usize, HandlerError> {
        let command_type = command.command_type();
        let mut invoked = 0;
        for handler in self.handlers.iter().filter(|h| h.supports(command_type)) {
            handler.handle(command, context).await?;
            invoked += 1;
        }
        if invoked == 0 {
            tracing::debug!("No handler for {} command, dropping it", command_type);
        }
        Ok(invoked)
    }
}

impl<C: Sync> Default for CommandDispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}
