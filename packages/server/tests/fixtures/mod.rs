//! Test fixtures: an in-process server and a raw WebSocket client.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use kairo_server::{ChatServer, EchoPolicy, ServerConfig, domain::ConnectionRegistry};
use kairo_shared::{ClientId, Command, CommandType, wire};
use tokio::{net::TcpListener, net::TcpStream, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

/// Server running on an ephemeral port for the duration of a test
pub struct TestServer {
    pub addr: SocketAddr,
    pub registry: Arc<dyn ConnectionRegistry>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(echo_policy: EchoPolicy) -> Self {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            echo_policy,
        };
        let listener = TcpListener::bind(config.bind_address())
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let server = ChatServer::new(&config);
        let registry = server.registry();
        let handle = tokio::spawn(async move {
            let _ = server.serve(listener, std::future::pending()).await;
        });
        Self {
            addr,
            registry,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Wait until the registry holds exactly `expected` entries
    pub async fn wait_for_len(&self, expected: usize) {
        let registry = self.registry.clone();
        tokio::time::timeout(Duration::from_secs(5), async move {
            while registry.len().await != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("Registry did not reach the expected size in time");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Raw WebSocket client speaking the command protocol
pub struct RawClient {
    pub socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl RawClient {
    pub async fn connect(server: &TestServer) -> Self {
        let (socket, _) = connect_async(server.ws_url())
            .await
            .expect("Failed to connect");
        Self { socket }
    }

    pub async fn send(&mut self, command: &Command) {
        let frame = wire::encode(command).unwrap();
        self.socket
            .send(Message::Text(frame.into()))
            .await
            .expect("Failed to send frame");
    }

    pub async fn send_raw(&mut self, frame: &str) {
        self.socket
            .send(Message::Text(frame.to_string().into()))
            .await
            .expect("Failed to send frame");
    }

    /// Receive the next command, failing after a timeout
    pub async fn recv(&mut self) -> Command {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match self.socket.next().await {
                    Some(Ok(Message::Text(text))) => return wire::decode(text.as_str()).unwrap(),
                    Some(Ok(_)) => continue,
                    other => panic!("Connection ended unexpectedly: {other:?}"),
                }
            }
        })
        .await
        .expect("Timed out waiting for a command")
    }

    /// Assert nothing arrives within a short window
    pub async fn expect_silence(&mut self) {
        let result =
            tokio::time::timeout(Duration::from_millis(200), self.socket.next()).await;
        assert!(result.is_err(), "Unexpected frame: {result:?}");
    }

    /// Log in and consume the LOGIN confirmation addressed to ourselves
    pub async fn login(&mut self, id: &str, name: &str) -> ClientId {
        let id = ClientId::new(id.to_string()).unwrap();
        self.send(&Command::new(CommandType::Login, name).with_id(id.clone()))
            .await;
        let confirmation = self.recv().await;
        assert_eq!(confirmation, Command::new(CommandType::Login, name));
        id
    }
}
