//! The command envelope exchanged between chat clients and the server.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_object::{ClientId, DisplayName, MessageContent};

/// Delimiter between the sender name and the text of a MESSAGE payload.
pub const NAME_SEPARATOR: &str = ":";

/// Command type.
///
/// Unknown type names decode to [`CommandType::Unknown`] so that peers speaking a
/// newer protocol revision do not break the read loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CommandType {
    Login,
    Logout,
    Message,
    Unknown,
}

impl CommandType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::Message => "MESSAGE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl From<String> for CommandType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "LOGIN" => Self::Login,
            "LOGOUT" => Self::Logout,
            "MESSAGE" => Self::Message,
            _ => Self::Unknown,
        }
    }
}

impl From<CommandType> for String {
    fn from(value: CommandType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed, payload-bearing unit of protocol data.
///
/// Payload conventions:
/// - LOGIN / LOGOUT: the display name
/// - MESSAGE: `"<displayName>: <text>"`
///
/// `id` is only present on commands a client sends about itself (and on the
/// acknowledgement of its own LOGOUT). Server-originated notices never carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "type")]
    command_type: CommandType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<ClientId>,
    payload: String,
}

impl Command {
    /// Create a command without an id.
    pub fn new(command_type: CommandType, payload: impl Into<String>) -> Self {
        Self {
            command_type,
            id: None,
            payload: payload.into(),
        }
    }

    /// LOGIN sent by a client announcing its id and display name.
    pub fn login(id: ClientId, name: &DisplayName) -> Self {
        Self::new(CommandType::Login, name.as_str()).with_id(id)
    }

    /// LOGOUT sent by a client for its own id.
    pub fn logout(id: ClientId, name: &DisplayName) -> Self {
        Self::new(CommandType::Logout, name.as_str()).with_id(id)
    }

    /// MESSAGE with the `"<name>: <text>"` payload.
    pub fn message(name: &DisplayName, text: &MessageContent) -> Self {
        Self::new(
            CommandType::Message,
            format!("{}{} {}", name, NAME_SEPARATOR, text),
        )
    }

    pub fn with_id(mut self, id: ClientId) -> Self {
        self.id = Some(id);
        self
    }

    /// Copy of this command with the id removed, as relayed to other clients.
    pub fn without_id(&self) -> Self {
        Self {
            command_type: self.command_type,
            id: None,
            payload: self.payload.clone(),
        }
    }

    pub fn command_type(&self) -> CommandType {
        self.command_type
    }

    pub fn id(&self) -> Option<&ClientId> {
        self.id.as_ref()
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Split a MESSAGE payload into `(sender name, text)`.
    ///
    /// Returns `None` when the payload does not follow `"<name>: <text>"`.
    pub fn message_parts(&self) -> Option<(&str, &str)> {
        let (name, rest) = self.payload.split_once(NAME_SEPARATOR)?;
        let text = rest.strip_prefix(' ')?;
        if name.is_empty() {
            return None;
        }
        Some((name, text))
    }
}
