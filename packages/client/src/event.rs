//! Events published to the presentation layer.

use std::fmt;

use tokio::sync::mpsc;

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectCause {
    /// `logout` completed
    LoggedOut,
    /// `cancel` closed the channel
    Cancelled,
    /// The server closed the channel
    ClosedByServer,
    /// Connect, read or write failed
    Transport(String),
}

impl fmt::Display for DisconnectCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoggedOut => f.write_str("logged out"),
            Self::Cancelled => f.write_str("cancelled"),
            Self::ClosedByServer => f.write_str("closed by server"),
            Self::Transport(e) => write!(f, "transport error: {e}"),
        }
    }
}

/// What the session tells the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Someone logged in (LOGIN received)
    Joined { display_name: String },
    /// Someone logged out or dropped (LOGOUT received)
    Left { display_name: String },
    /// MESSAGE received
    Message { sender: String, text: String },
    /// The session is over; published once per connection
    Disconnected(DisconnectCause),
    /// A recoverable error
    Failure(String),
}

/// Subscriber interface injected into the session.
///
/// `publish` must not block: it is called from the session's network tasks.
/// Implementations marshal events onto their own UI thread.
#[cfg_attr(test, mockall::automock)]
pub trait EventNotifier: Send + Sync {
    fn publish(&self, event: SessionEvent);
}

/// Notifier backed by a channel consumed by a single presentation task.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventNotifier for ChannelNotifier {
    fn publish(&self, event: SessionEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::debug!("No subscriber for session event: {:?}", e.0);
        }
    }
}
