//! Command line and runtime configuration for the server.

use clap::{Parser, ValueEnum};

/// Whether a MESSAGE is relayed back to the client that sent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EchoPolicy {
    /// Every registered client receives the message, sender included.
    #[default]
    EchoSender,
    /// Everyone except the sender receives the message.
    SkipSender,
}

#[derive(Debug, Parser)]
#[command(name = "kairo-server", version, about = "Kairo chat server")]
pub struct ServerArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// Whether messages are echoed back to their sender
    #[arg(long, value_enum, default_value_t = EchoPolicy::EchoSender)]
    pub echo: EchoPolicy,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "debug")]
    pub log_level: String,
}

impl ServerArgs {
    pub fn into_config(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            echo_policy: self.echo,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub echo_policy: EchoPolicy,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            echo_policy: EchoPolicy::default(),
        }
    }
}
