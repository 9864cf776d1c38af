//! Client error definitions.

use kairo_shared::ValueObjectError;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: Box<tungstenite::Error>,
    },

    #[error("timed out connecting to {0}")]
    ConnectTimeout(String),

    #[error("session is already connected")]
    AlreadyConnected,

    #[error("session is not connected")]
    NotConnected,

    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValueObjectError),

    #[error("server did not acknowledge LOGOUT")]
    LogoutNotAcknowledged,

    #[error("failed to read input: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}
