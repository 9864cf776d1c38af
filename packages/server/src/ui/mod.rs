//! WebSocket chat server UI layer: routing, connection handling and startup.

mod handler;
mod runner;
mod signal;
pub mod state;

pub use runner::{ChatServer, run_server};
