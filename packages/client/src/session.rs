//! Client session: one WebSocket connection to the server.
//!
//! ```text
//!            login                 logout / cancel / error
//! Disconnected ──> Connecting ──> Connected ──────────────> Disconnected
//!                      │                                        ^
//!                      └──────────── connect failed ────────────┘
//! ```
//!
//! A connected session runs two tasks: the writer drains an outbound queue
//! into the socket sink, the reader decodes frames and dispatches them to the
//! client handlers. `Disconnected` is published once per connection, however
//! many paths race to report the end.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use kairo_shared::{
    ClientId, ClientIdFactory, Command, CommandDispatcher, CommandType, DisplayName,
    MessageContent, wire,
};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::config::SessionConfig;
use crate::error::ClientError;
use crate::event::{DisconnectCause, EventNotifier, SessionEvent};
use crate::handler::build_client_dispatcher;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long `logout` and `cancel` let the writer flush the close frame.
const CLOSE_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
}

enum Outbound {
    Command(Command),
    Close,
}

/// State shared between the session and its network tasks.
struct SessionShared {
    state: watch::Sender<SessionState>,
    notifier: Arc<dyn EventNotifier>,
    /// Set while the session itself is closing the channel.
    closing: AtomicBool,
    logout_ack: Mutex<Option<oneshot::Sender<()>>>,
}

impl SessionShared {
    fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    fn set_state(&self, state: SessionState) {
        self.state.send_replace(state);
    }

    /// Move to `Disconnected`. Only the first caller per connection wins.
    fn end(&self) -> bool {
        self.state.send_if_modified(|state| {
            if *state == SessionState::Disconnected {
                false
            } else {
                *state = SessionState::Disconnected;
                true
            }
        })
    }

    /// Move to `Disconnected` and publish `cause`, unless already there.
    fn disconnect(&self, cause: DisconnectCause) {
        if self.end() {
            tracing::info!("Session disconnected: {}", cause);
            self.notifier.publish(SessionEvent::Disconnected(cause));
        }
    }

    /// Report a transport failure: `Failure` then `Disconnected`.
    fn fail(&self, error: String) {
        if self.closing.load(Ordering::SeqCst) || !self.end() {
            return;
        }
        tracing::warn!("Session failed: {}", error);
        self.notifier.publish(SessionEvent::Failure(error.clone()));
        self.notifier
            .publish(SessionEvent::Disconnected(DisconnectCause::Transport(error)));
    }
}

/// The live side of a connected session. Dropping it stops both tasks.
struct ActiveConnection {
    id: ClientId,
    display_name: DisplayName,
    outbound: mpsc::UnboundedSender<Outbound>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl Drop for ActiveConnection {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

/// A chat client session.
pub struct ChatSession {
    config: SessionConfig,
    dispatcher: Arc<CommandDispatcher<()>>,
    shared: Arc<SessionShared>,
    connection: Option<ActiveConnection>,
}

impl ChatSession {
    pub fn new(config: SessionConfig, notifier: Arc<dyn EventNotifier>) -> Self {
        let (state, _) = watch::channel(SessionState::Disconnected);
        Self {
            config,
            dispatcher: Arc::new(build_client_dispatcher(notifier.clone())),
            shared: Arc::new(SessionShared {
                state,
                notifier,
                closing: AtomicBool::new(false),
                logout_ack: Mutex::new(None),
            }),
            connection: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// Receiver that observes every state transition.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    /// Id of the current connection, if any.
    pub fn client_id(&self) -> Option<&ClientId> {
        self.connection.as_ref().map(|c| &c.id)
    }

    /// Connect to `host:port`, generate a fresh id and send LOGIN.
    ///
    /// Returns once LOGIN is queued; the server's LOGIN notice arrives later
    /// as a `Joined` event. On connect failure a `Failure` and a
    /// `Disconnected` event are published as well as the error returned.
    pub async fn login(
        &mut self,
        host: &str,
        port: u16,
        display_name: &str,
    ) -> Result<ClientId, ClientError> {
        if self.state() != SessionState::Disconnected {
            return Err(ClientError::AlreadyConnected);
        }
        let display_name = DisplayName::new(display_name.to_string())?;
        let id = ClientIdFactory::generate()?;

        self.connection = None;
        self.shared.closing.store(false, Ordering::SeqCst);
        self.shared.set_state(SessionState::Connecting);

        let url = format!("ws://{host}:{port}/ws");
        tracing::info!("Connecting to {}", url);
        let socket = match timeout(self.config.connect_timeout, connect_async(url.as_str())).await
        {
            Ok(Ok((socket, _))) => socket,
            Ok(Err(e)) => {
                let error = ClientError::Connect {
                    url,
                    source: Box::new(e),
                };
                self.shared.fail(error.to_string());
                return Err(error);
            }
            Err(_) => {
                let error = ClientError::ConnectTimeout(url);
                self.shared.fail(error.to_string());
                return Err(error);
            }
        };

        let (sink, stream) = socket.split();
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        // LOGIN is queued before the writer starts, so it is the first frame.
        let _ = outbound.send(Outbound::Command(Command::login(id.clone(), &display_name)));
        self.shared.set_state(SessionState::Connected);

        let writer = tokio::spawn(write_loop(sink, outbound_rx, self.shared.clone()));
        let reader = tokio::spawn(read_loop(
            stream,
            self.dispatcher.clone(),
            self.shared.clone(),
            id.clone(),
        ));
        tracing::info!("Logged in as '{}' ({})", display_name, id);

        self.connection = Some(ActiveConnection {
            id: id.clone(),
            display_name,
            outbound,
            reader,
            writer,
        });
        Ok(id)
    }

    /// Queue a MESSAGE carrying `text`.
    ///
    /// A transport failure is reported through events, not through the
    /// returned error.
    pub fn send(&self, text: &str) -> Result<(), ClientError> {
        let connection = self.connected()?;
        let content = MessageContent::new(text.to_string())?;
        let command = Command::message(&connection.display_name, &content);
        if connection.outbound.send(Outbound::Command(command)).is_err() {
            self.shared.fail("outbound queue closed".to_string());
        }
        Ok(())
    }

    /// Send LOGOUT, wait for the server's acknowledgement, then close.
    ///
    /// The channel is closed and `Disconnected(LoggedOut)` published even
    /// when the acknowledgement does not arrive in time.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        let connection = self.connected()?;
        let (ack_tx, ack_rx) = oneshot::channel();
        *self.shared.logout_ack.lock().await = Some(ack_tx);

        let logout = Command::logout(connection.id.clone(), &connection.display_name);
        let acknowledged = if connection.outbound.send(Outbound::Command(logout)).is_ok() {
            matches!(
                timeout(self.config.logout_timeout, ack_rx).await,
                Ok(Ok(()))
            )
        } else {
            false
        };

        self.close(DisconnectCause::LoggedOut).await;
        if acknowledged {
            Ok(())
        } else {
            tracing::warn!("LOGOUT was not acknowledged by the server");
            Err(ClientError::LogoutNotAcknowledged)
        }
    }

    /// Close the channel without LOGOUT. The server cleans up on its side.
    pub async fn cancel(&mut self) {
        self.close(DisconnectCause::Cancelled).await;
    }

    fn connected(&self) -> Result<&ActiveConnection, ClientError> {
        match &self.connection {
            Some(connection) if self.state() == SessionState::Connected => Ok(connection),
            _ => Err(ClientError::NotConnected),
        }
    }

    async fn close(&mut self, cause: DisconnectCause) {
        let Some(mut connection) = self.connection.take() else {
            return;
        };
        self.shared.closing.store(true, Ordering::SeqCst);
        if connection.outbound.send(Outbound::Close).is_ok()
            && timeout(CLOSE_GRACE, &mut connection.writer).await.is_err()
        {
            tracing::debug!("Writer did not flush the close frame in time");
        }
        drop(connection);
        self.shared.disconnect(cause);
    }
}

async fn write_loop(
    mut sink: SplitSink<WsStream, Message>,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    shared: Arc<SessionShared>,
) {
    while let Some(item) = outbound.recv().await {
        match item {
            Outbound::Command(command) => {
                let frame = match wire::encode(&command) {
                    Ok(frame) => frame,
                    Err(e) => {
                        shared.notifier.publish(SessionEvent::Failure(e.to_string()));
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(frame.into())).await {
                    shared.fail(format!("failed to send {}: {}", command.command_type(), e));
                    break;
                }
            }
            Outbound::Close => {
                if let Err(e) = sink.send(Message::Close(None)).await {
                    tracing::debug!("Failed to send close frame: {}", e);
                }
                break;
            }
        }
    }
}

async fn read_loop(
    mut stream: SplitStream<WsStream>,
    dispatcher: Arc<CommandDispatcher<()>>,
    shared: Arc<SessionShared>,
    own_id: ClientId,
) {
    let cause = loop {
        let message = match stream.next().await {
            Some(Ok(message)) => message,
            Some(Err(e)) => break DisconnectCause::Transport(e.to_string()),
            None => break DisconnectCause::ClosedByServer,
        };
        match message {
            Message::Text(text) => {
                let command = match wire::decode(text.as_str()) {
                    Ok(command) => command,
                    Err(e) => {
                        tracing::warn!("Dropping undecodable frame: {}", e);
                        continue;
                    }
                };
                if command.command_type() == CommandType::Logout && command.id() == Some(&own_id) {
                    if let Some(ack) = shared.logout_ack.lock().await.take() {
                        let _ = ack.send(());
                    }
                    continue;
                }
                if shared.state() == SessionState::Disconnected {
                    break DisconnectCause::ClosedByServer;
                }
                if let Err(e) = dispatcher.dispatch(&command, &()).await {
                    shared.notifier.publish(SessionEvent::Failure(e.to_string()));
                }
            }
            Message::Close(_) => break DisconnectCause::ClosedByServer,
            _ => {}
        }
    };

    // a pending logout stops waiting
    shared.logout_ack.lock().await.take();
    if shared.closing.load(Ordering::SeqCst) {
        return;
    }
    match cause {
        DisconnectCause::Transport(error) => shared.fail(error),
        cause => shared.disconnect(cause),
    }
}
