//! End-to-end session tests against an in-process server.

use std::{sync::Arc, time::Duration};

use futures_util::StreamExt;
use kairo_client::{
    ChannelNotifier, ChatSession, ClientError, DisconnectCause, SessionConfig, SessionEvent,
    SessionState,
};
use kairo_server::{ChatServer, EchoPolicy, ServerConfig};
use kairo_shared::{CommandType, wire};
use tokio::{net::TcpListener, sync::mpsc::UnboundedReceiver, task::JoinHandle};
use tokio_tungstenite::{accept_async, tungstenite::Message};

struct Server {
    port: u16,
    handle: JoinHandle<()>,
}

impl Drop for Server {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn start_server(echo_policy: EchoPolicy) -> Server {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        echo_policy,
    };
    let listener = TcpListener::bind(config.bind_address()).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = ChatServer::new(&config);
    let handle = tokio::spawn(async move {
        let _ = server.serve(listener, std::future::pending()).await;
    });
    Server { port, handle }
}

fn create_session() -> (ChatSession, UnboundedReceiver<SessionEvent>) {
    let (notifier, events) = ChannelNotifier::new();
    let config = SessionConfig {
        connect_timeout: Duration::from_secs(2),
        logout_timeout: Duration::from_secs(2),
    };
    (ChatSession::new(config, Arc::new(notifier)), events)
}

async fn next_event(events: &mut UnboundedReceiver<SessionEvent>) -> SessionEvent {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("Timed out waiting for a session event")
        .expect("Event channel closed")
}

async fn expect_no_event(events: &mut UnboundedReceiver<SessionEvent>) {
    let result = tokio::time::timeout(Duration::from_millis(200), events.recv()).await;
    assert!(result.is_err(), "Unexpected event: {result:?}");
}

fn joined(name: &str) -> SessionEvent {
    SessionEvent::Joined {
        display_name: name.to_string(),
    }
}

fn message(sender: &str, text: &str) -> SessionEvent {
    SessionEvent::Message {
        sender: sender.to_string(),
        text: text.to_string(),
    }
}

#[tokio::test]
async fn test_two_sessions_exchange_messages_without_echo() {
    // テスト項目: skip-sender のサーバーで A の送信が B にだけ届く
    // given (前提条件):
    let server = start_server(EchoPolicy::SkipSender).await;
    let (mut alice, mut alice_events) = create_session();
    let (mut bob, mut bob_events) = create_session();
    alice.login("127.0.0.1", server.port, "alice").await.unwrap();
    assert_eq!(next_event(&mut alice_events).await, joined("alice"));
    bob.login("127.0.0.1", server.port, "bob").await.unwrap();
    assert_eq!(next_event(&mut bob_events).await, joined("bob"));
    assert_eq!(next_event(&mut alice_events).await, joined("bob"));

    // when (操作):
    alice.send("hello bob").unwrap();

    // then (期待する結果):
    assert_eq!(
        next_event(&mut bob_events).await,
        message("alice", "hello bob")
    );
    expect_no_event(&mut alice_events).await;
    assert_eq!(alice.state(), SessionState::Connected);
}

#[tokio::test]
async fn test_sender_receives_echo() {
    // テスト項目: echo-sender のサーバーでは送信者にも自分のメッセージが 1 回届く
    // given (前提条件):
    let server = start_server(EchoPolicy::EchoSender).await;
    let (mut alice, mut events) = create_session();
    alice.login("127.0.0.1", server.port, "alice").await.unwrap();
    assert_eq!(next_event(&mut events).await, joined("alice"));

    // when (操作):
    alice.send("hi: all").unwrap();

    // then (期待する結果):
    assert_eq!(next_event(&mut events).await, message("alice", "hi: all"));
    expect_no_event(&mut events).await;
}

#[tokio::test]
async fn test_logout_waits_for_ack_and_notifies_others() {
    // テスト項目: logout は確認応答を受けてから切断し、他の参加者には Left が届く
    // given (前提条件):
    let server = start_server(EchoPolicy::EchoSender).await;
    let (mut alice, mut alice_events) = create_session();
    let (mut bob, mut bob_events) = create_session();
    alice.login("127.0.0.1", server.port, "alice").await.unwrap();
    bob.login("127.0.0.1", server.port, "bob").await.unwrap();
    assert_eq!(next_event(&mut bob_events).await, joined("bob"));

    // when (操作):
    let result = alice.logout().await;

    // then (期待する結果):
    assert!(result.is_ok());
    assert_eq!(alice.state(), SessionState::Disconnected);
    assert_eq!(
        next_event(&mut bob_events).await,
        SessionEvent::Left {
            display_name: "alice".to_string()
        }
    );
    // alice: 自分と bob の Joined の後に LoggedOut が 1 回だけ
    assert_eq!(next_event(&mut alice_events).await, joined("alice"));
    assert_eq!(next_event(&mut alice_events).await, joined("bob"));
    assert_eq!(
        next_event(&mut alice_events).await,
        SessionEvent::Disconnected(DisconnectCause::LoggedOut)
    );
    expect_no_event(&mut alice_events).await;
    assert!(matches!(alice.send("late"), Err(ClientError::NotConnected)));
}

#[tokio::test]
async fn test_cancel_disconnects_and_server_announces() {
    // テスト項目: cancel で即座に切断され、サーバー側で退出が通知される
    // given (前提条件):
    let server = start_server(EchoPolicy::EchoSender).await;
    let (mut alice, mut alice_events) = create_session();
    let (mut bob, mut bob_events) = create_session();
    alice.login("127.0.0.1", server.port, "alice").await.unwrap();
    bob.login("127.0.0.1", server.port, "bob").await.unwrap();
    assert_eq!(next_event(&mut bob_events).await, joined("bob"));

    // when (操作):
    alice.cancel().await;

    // then (期待する結果):
    assert_eq!(
        next_event(&mut bob_events).await,
        SessionEvent::Left {
            display_name: "alice".to_string()
        }
    );
    let mut last = None;
    while let Ok(event) = alice_events.try_recv() {
        last = Some(event);
    }
    assert_eq!(
        last,
        Some(SessionEvent::Disconnected(DisconnectCause::Cancelled))
    );
}

#[tokio::test]
async fn test_server_close_publishes_disconnected() {
    // テスト項目: サーバーがチャンネルを閉じると Disconnected(ClosedByServer) が 1 回発行される
    // given (前提条件): LOGIN を受け取ったら閉じるだけのサーバー
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let peer = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut socket = accept_async(stream).await.unwrap();
        let first = match socket.next().await {
            Some(Ok(Message::Text(text))) => wire::decode(text.as_str()).unwrap(),
            other => panic!("Expected LOGIN frame, got {other:?}"),
        };
        socket.close(None).await.unwrap();
        first
    });
    let (mut session, mut events) = create_session();

    // when (操作):
    let id = session.login("127.0.0.1", port, "alice").await.unwrap();
    let login = peer.await.unwrap();

    // then (期待する結果):
    assert_eq!(login.command_type(), CommandType::Login);
    assert_eq!(login.id(), Some(&id));
    assert_eq!(login.payload(), "alice");
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::Disconnected(DisconnectCause::ClosedByServer)
    );
    expect_no_event(&mut events).await;
    assert_eq!(session.state(), SessionState::Disconnected);
}

#[tokio::test]
async fn test_login_to_unreachable_server_fails() {
    // テスト項目: 接続できない場合は Err を返し、Failure と Disconnected が発行される
    // given (前提条件): 閉じたポート
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let (mut session, mut events) = create_session();

    // when (操作):
    let result = session.login("127.0.0.1", port, "alice").await;

    // then (期待する結果):
    assert!(matches!(result, Err(ClientError::Connect { .. })));
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(matches!(
        next_event(&mut events).await,
        SessionEvent::Failure(_)
    ));
    assert!(matches!(
        next_event(&mut events).await,
        SessionEvent::Disconnected(DisconnectCause::Transport(_))
    ));
}

#[tokio::test]
async fn test_each_login_gets_a_fresh_id() {
    // テスト項目: ログインし直すたびに新しい ID が生成される
    // given (前提条件):
    let server = start_server(EchoPolicy::EchoSender).await;
    let (mut session, _events) = create_session();
    let first = session.login("127.0.0.1", server.port, "alice").await.unwrap();
    session.logout().await.unwrap();

    // when (操作):
    let second = session.login("127.0.0.1", server.port, "alice").await.unwrap();

    // then (期待する結果):
    assert_ne!(first, second);
    assert_eq!(session.client_id(), Some(&second));
}

#[tokio::test]
async fn test_unacknowledged_logout_still_closes() {
    // テスト項目: LOGOUT に確認応答が返らなくても切断され、LogoutNotAcknowledged が返る
    // given (前提条件): 受信したフレームを記録するだけで何も返さないサーバー
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let peer = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut socket = accept_async(stream).await.unwrap();
        let mut received = Vec::new();
        while let Some(Ok(Message::Text(text))) = socket.next().await {
            received.push(wire::decode(text.as_str()).unwrap());
        }
        received
    });
    let (notifier, mut events) = ChannelNotifier::new();
    let config = SessionConfig {
        connect_timeout: Duration::from_secs(2),
        logout_timeout: Duration::from_millis(300),
    };
    let mut session = ChatSession::new(config, Arc::new(notifier));
    let id = session.login("127.0.0.1", port, "alice").await.unwrap();

    // when (操作):
    let result = session.logout().await;

    // then (期待する結果):
    assert!(matches!(result, Err(ClientError::LogoutNotAcknowledged)));
    assert_eq!(session.state(), SessionState::Disconnected);
    assert_eq!(
        next_event(&mut events).await,
        SessionEvent::Disconnected(DisconnectCause::LoggedOut)
    );
    expect_no_event(&mut events).await;

    // サーバーには LOGIN と LOGOUT が順に届いている
    let received = tokio::time::timeout(Duration::from_secs(5), peer)
        .await
        .expect("Peer did not see the channel close")
        .unwrap();
    let types: Vec<_> = received.iter().map(|c| c.command_type()).collect();
    assert_eq!(types, vec![CommandType::Login, CommandType::Logout]);
    assert_eq!(received[1].id(), Some(&id));
}

#[tokio::test]
async fn test_dropped_transport_publishes_failure_then_disconnected() {
    // テスト項目: 通信路が切れた後の送信では Failure の後に Disconnected(Transport) が 1 回だけ発行され、以後は送信できない
    // given (前提条件): LOGIN を受け取ったら Close フレームなしで TCP ごと切断するサーバー
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let peer = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut socket = accept_async(stream).await.unwrap();
        let _ = socket.next().await;
        drop(socket);
    });
    let (mut session, mut events) = create_session();
    session.login("127.0.0.1", port, "alice").await.unwrap();
    peer.await.unwrap();

    // when (操作):
    let result = session.send("anyone there?");

    // then (期待する結果): 切断の検出が送信より先でも後でも、イベントは同じ
    assert!(matches!(result, Ok(()) | Err(ClientError::NotConnected)));
    assert!(matches!(
        next_event(&mut events).await,
        SessionEvent::Failure(_)
    ));
    assert!(matches!(
        next_event(&mut events).await,
        SessionEvent::Disconnected(DisconnectCause::Transport(_))
    ));
    expect_no_event(&mut events).await;
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(matches!(
        session.send("still there?"),
        Err(ClientError::NotConnected)
    ));
}
