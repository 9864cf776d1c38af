//! Command line and session configuration for the client.

use std::time::Duration;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "kairo-client", version, about = "Kairo chat client")]
pub struct ClientArgs {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Server port
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Display name shown to other clients
    #[arg(short, long)]
    pub name: String,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// How long to wait for the server to acknowledge LOGOUT
    #[arg(long, default_value_t = 5000)]
    pub logout_timeout_ms: u64,
}

impl ClientArgs {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            logout_timeout: Duration::from_millis(self.logout_timeout_ms),
            ..SessionConfig::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub connect_timeout: Duration,
    pub logout_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            logout_timeout: Duration::from_secs(5),
        }
    }
}
