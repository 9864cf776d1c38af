//! Domain layer for the chat server.
//!
//! This module contains the connection model and the registry abstraction,
//! independent of the transport and of the in-memory storage behind it.

pub mod entity;
pub mod repository;

pub use entity::{ClientSender, Connection};
pub use repository::ConnectionRegistry;
