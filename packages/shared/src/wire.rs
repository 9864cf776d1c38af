//! JSON framing of commands: one command per WebSocket text frame.

use crate::{command::Command, error::CodecError};

/// Encode a command into a text frame.
pub fn encode(command: &Command) -> Result<String, CodecError> {
    Ok(serde_json::to_string(command)?)
}

/// Decode a text frame into a command.
pub fn decode(frame: &str) -> Result<Command, CodecError> {
    Ok(serde_json::from_str(frame)?)
}
