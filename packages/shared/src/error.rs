//! Error definitions shared by the server and the client.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// ClientId validation error
    #[error("ClientId cannot be empty")]
    ClientIdEmpty,

    /// ClientId too long error
    #[error("ClientId cannot exceed {max} characters (got {actual})")]
    ClientIdTooLong { max: usize, actual: usize },

    /// DisplayName validation error
    #[error("DisplayName cannot be empty")]
    DisplayNameEmpty,

    /// DisplayName too long error
    #[error("DisplayName cannot exceed {max} characters (got {actual})")]
    DisplayNameTooLong { max: usize, actual: usize },

    /// DisplayName contains a character reserved by the protocol
    #[error("DisplayName cannot contain {0:?}")]
    DisplayNameInvalidChar(char),

    /// MessageContent validation error
    #[error("MessageContent cannot be empty")]
    MessageContentEmpty,

    /// MessageContent too long error
    #[error("MessageContent cannot exceed {max} characters (got {actual})")]
    MessageContentTooLong { max: usize, actual: usize },
}

/// Errors raised while encoding or decoding commands on the wire
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed command frame: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors a command handler hands back to the read loop that dispatched it
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The channel the command arrived on can no longer be written to
    #[error("originating channel is closed")]
    ChannelClosed,
}
