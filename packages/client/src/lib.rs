//! Kairo chat client.
//!
//! A [`ChatSession`] owns one WebSocket to the server, turns user intents into
//! commands, and feeds inbound commands through its own dispatcher. Everything
//! the presentation layer needs to show arrives as [`SessionEvent`]s on an
//! [`EventNotifier`].

pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod runner;
pub mod session;

pub use config::{ClientArgs, SessionConfig};
pub use error::ClientError;
pub use event::{ChannelNotifier, DisconnectCause, EventNotifier, SessionEvent};
pub use runner::run_client;
pub use session::{ChatSession, SessionState};
