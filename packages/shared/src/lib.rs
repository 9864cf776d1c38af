//! Shared building blocks for the Kairo chat protocol.
//!
//! Both the server and the client speak the same typed command protocol:
//! [`Command`] values travel over a duplex channel and are routed to
//! [`CommandHandler`]s by a [`CommandDispatcher`] on each side.

pub mod command;
pub mod dispatcher;
pub mod error;
pub mod factory;
pub mod logger;
pub mod time;
pub mod value_object;
pub mod wire;

pub use command::{Command, CommandType, NAME_SEPARATOR};
pub use dispatcher::{CommandDispatcher, CommandHandler};
pub use error::{CodecError, HandlerError, ValueObjectError};
pub use factory::ClientIdFactory;
pub use value_object::{ClientId, DisplayName, MessageContent, Timestamp};
