//! Kairo chat server.
//!
//! Accepts one WebSocket per client, reads typed commands off it and routes them
//! through a [`kairo_shared::CommandDispatcher`] wired with the login, logout and
//! message handlers. The [`domain::ConnectionRegistry`] is the only state shared
//! between connections.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub use config::{EchoPolicy, ServerArgs, ServerConfig};
pub use error::ServerError;
pub use ui::{ChatServer, run_server};
