//! Integration tests for the Roomcast server.
//!
//! Each test runs the real router in-process on an ephemeral port and talks to it
//! over WebSocket (`tokio-tungstenite`) and HTTP (`reqwest`). Time is driven by a
//! `ManualClock` so inactivity sweeps are deterministic.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::{net::TcpStream, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use roomcast_server::{
    config::InactivityConfig,
    domain::{LogEntry, LogFields, MessageLog, MessageLogError, RoomId},
    infrastructure::{
        message_pusher::SessionRegistry,
        repository::{InMemoryMessageLog, InMemoryPresenceStore},
    },
    ui::{router, state::AppState},
    usecase::{ChatHistoryUseCase, InactivitySweeper, PresenceTracker, RoomCoordinator},
};
use roomcast_shared::time::ManualClock;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const T0: i64 = 1_700_000_000_000;

/// Helper struct to manage an in-process server
struct TestServer {
    addr: SocketAddr,
    clock: Arc<ManualClock>,
    registry: Arc<SessionRegistry>,
    sweeper: Arc<InactivitySweeper>,
    handle: JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let clock = Arc::new(ManualClock::new(T0));
        let message_log = Arc::new(InMemoryMessageLog::new(clock.clone()));
        Self::start_with_log(clock, message_log).await
    }

    async fn start_with_log(clock: Arc<ManualClock>, message_log: Arc<dyn MessageLog>) -> Self {
        let timeout = Duration::from_secs(1);
        let registry = Arc::new(SessionRegistry::new(timeout));
        let presence = Arc::new(PresenceTracker::new(
            Arc::new(InMemoryPresenceStore::new()),
            clock.clone(),
            timeout,
        ));
        let coordinator = Arc::new(RoomCoordinator::new(
            registry.clone(),
            presence.clone(),
            message_log.clone(),
            clock.clone(),
            timeout,
        ));
        let sweeper = Arc::new(InactivitySweeper::new(
            registry.clone(),
            presence,
            clock.clone(),
            InactivityConfig::new(60, 10).unwrap(),
        ));
        let state = Arc::new(AppState {
            connection_handler: coordinator,
            chat_history_usecase: Arc::new(ChatHistoryUseCase::new(message_log, timeout)),
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(state);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            clock,
            registry,
            sweeper,
            handle,
        }
    }

    fn ws_url(&self, room: &str, username: Option<&str>) -> String {
        match username {
            Some(name) => format!("ws://{}/{}?username={}", self.addr, room, name),
            None => format!("ws://{}/{}", self.addr, room),
        }
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Connect and wait until the session is registered in the room
    async fn connect(&self, room: &str, username: Option<&str>) -> WsClient {
        let room_id = RoomId::new(room.to_string()).unwrap();
        let before = self.registry.session_count(&room_id);
        let (ws, _) = connect_async(self.ws_url(room, username))
            .await
            .expect("Failed to connect");
        self.wait_for_sessions(room, before + 1).await;
        ws
    }

    async fn wait_for_sessions(&self, room: &str, expected: usize) {
        let room_id = RoomId::new(room.to_string()).unwrap();
        for _ in 0..100 {
            if self.registry.session_count(&room_id) == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!(
            "Room '{}' did not reach {} session(s), has {}",
            room,
            expected,
            self.registry.session_count(&room_id)
        );
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Receive the next text frame, or None if nothing arrives in time
async fn recv_text(ws: &mut WsClient, wait: Duration) -> Option<String> {
    match tokio::time::timeout(wait, ws.next()).await {
        Ok(Some(Ok(Message::Text(text)))) => Some(text.to_string()),
        _ => None,
    }
}

async fn send_text(ws: &mut WsClient, text: &str) {
    ws.send(Message::Text(text.into()))
        .await
        .expect("Failed to send");
}

fn parse(frame: &str) -> serde_json::Value {
    serde_json::from_str(frame).expect("Frame is not JSON")
}

/// Message log that is always down
struct UnavailableLog;

#[async_trait]
impl MessageLog for UnavailableLog {
    async fn append(&self, _key: &str, _fields: LogFields) -> Result<String, MessageLogError> {
        Err(MessageLogError::Unavailable("log is down".to_string()))
    }

    async fn read_all(&self, _key: &str) -> Result<Vec<LogEntry>, MessageLogError> {
        Err(MessageLogError::Unavailable("log is down".to_string()))
    }

    async fn clear(&self, _key: &str) -> Result<(), MessageLogError> {
        Err(MessageLogError::Unavailable("log is down".to_string()))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_message_reaches_others_without_echo() {
    // テスト項目: bob のメッセージが同じルームの alice に届き、bob 自身には届かない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("r1", Some("alice")).await;
    let mut bob = server.connect("r1", Some("bob")).await;

    // when (操作):
    send_text(&mut bob, "hi").await;

    // then (期待する結果):
    let frame = recv_text(&mut alice, Duration::from_secs(2))
        .await
        .expect("alice should receive bob's message");
    let value = parse(&frame);
    assert_eq!(value["username"], "bob");
    assert_eq!(value["messageContent"], "hi");
    assert_eq!(value["ts"], T0);
    assert!(value["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(frame.starts_with(r#"{"id":"#));

    assert_eq!(recv_text(&mut bob, Duration::from_millis(300)).await, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rooms_are_isolated() {
    // テスト項目: 別のルームの参加者にはメッセージが届かない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("r1", Some("alice")).await;
    let mut bob = server.connect("r1", Some("bob")).await;
    let mut carol = server.connect("r2", Some("carol")).await;

    // when (操作):
    send_text(&mut bob, "only r1").await;

    // then (期待する結果):
    assert!(recv_text(&mut alice, Duration::from_secs(2)).await.is_some());
    assert_eq!(recv_text(&mut carol, Duration::from_millis(300)).await, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_missing_username_defaults_to_anonymous() {
    // テスト項目: username を指定しない接続は "anonymous" として扱われる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("r1", Some("alice")).await;
    let mut nameless = server.connect("r1", None).await;

    // when (操作):
    send_text(&mut nameless, "who am i").await;

    // then (期待する結果):
    let frame = recv_text(&mut alice, Duration::from_secs(2)).await.unwrap();
    assert_eq!(parse(&frame)["username"], "anonymous");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_messages_arrive_in_send_order() {
    // テスト項目: 同じ接続から送ったメッセージは送信順に届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("r1", Some("alice")).await;
    let mut bob = server.connect("r1", Some("bob")).await;

    // when (操作):
    for text in ["one", "two", "three"] {
        send_text(&mut bob, text).await;
    }

    // then (期待する結果):
    let mut received = Vec::new();
    for _ in 0..3 {
        let frame = recv_text(&mut alice, Duration::from_secs(2)).await.unwrap();
        received.push(parse(&frame)["messageContent"].as_str().unwrap().to_string());
    }
    assert_eq!(received, vec!["one", "two", "three"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_persist_failure_sends_error_frame_to_sender_only() {
    // テスト項目: ログへの追記に失敗すると送信者にだけエラーフレームが返り、誰にも配信されない
    // given (前提条件):
    let server =
        TestServer::start_with_log(Arc::new(ManualClock::new(T0)), Arc::new(UnavailableLog))
            .await;
    let mut alice = server.connect("r1", Some("alice")).await;
    let mut bob = server.connect("r1", Some("bob")).await;

    // when (操作):
    send_text(&mut bob, "lost").await;

    // then (期待する結果):
    let frame = recv_text(&mut bob, Duration::from_secs(2))
        .await
        .expect("bob should receive an error frame");
    let value = parse(&frame);
    assert_eq!(value["type"], "error");
    assert!(value["message"].as_str().is_some_and(|m| !m.is_empty()));

    assert_eq!(recv_text(&mut alice, Duration::from_millis(300)).await, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_disconnect_unregisters_session() {
    // テスト項目: 切断するとセッションがルームから登録解除される
    // given (前提条件):
    let server = TestServer::start().await;
    let _alice = server.connect("r1", Some("alice")).await;
    let mut bob = server.connect("r1", Some("bob")).await;

    // when (操作):
    bob.close(None).await.unwrap();

    // then (期待する結果):
    server.wait_for_sessions("r1", 1).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_inactive_user_is_announced_to_room() {
    // テスト項目: しきい値を超えて沈黙したユーザーがルームに通知され、再通知されない
    // given (前提条件): bob は t0、alice は t0+50s に接続（しきい値 60 秒）
    let server = TestServer::start().await;
    let _bob = server.connect("r1", Some("bob")).await;
    server.clock.set(T0 + 50_000);
    let mut alice = server.connect("r1", Some("alice")).await;

    // when (操作):
    server.clock.set(T0 + 61_000);
    let report = server.sweeper.sweep_once().await;

    // then (期待する結果):
    let r1 = RoomId::new("r1".to_string()).unwrap();
    assert_eq!(report.evicted.len(), 1);
    assert_eq!(report.evicted[0].0, r1);
    assert_eq!(report.evicted[0].1.as_str(), "bob");

    let frame = recv_text(&mut alice, Duration::from_secs(2)).await.unwrap();
    assert_eq!(frame, r#"{"type":"userInactive","user":"bob"}"#);

    server.clock.set(T0 + 121_000);
    let again = server.sweeper.sweep_once().await;
    assert!(again.evicted.iter().all(|(_, user)| user.as_str() != "bob"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_chat_history_get_and_delete() {
    // テスト項目: 送信したメッセージが履歴として取得でき、削除後は空になる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("r1", Some("alice")).await;
    let mut bob = server.connect("r1", Some("bob")).await;
    send_text(&mut bob, "hi").await;
    recv_text(&mut alice, Duration::from_secs(2)).await.unwrap();

    // when (操作):
    let lines: Vec<String> = reqwest::get(server.http_url("/chat/r1"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let deleted = reqwest::Client::new()
        .delete(server.http_url("/chat/r1"))
        .send()
        .await
        .unwrap();
    let after: Vec<String> = reqwest::get(server.http_url("/chat/r1"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with('['));
    assert!(lines[0].ends_with("] bob: hi"));
    assert_eq!(deleted.status(), reqwest::StatusCode::NO_CONTENT);
    assert!(after.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_chat_history_of_unknown_room_is_empty() {
    // テスト項目: メッセージのないルームの履歴は空配列、削除も成功する
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let response = reqwest::get(server.http_url("/chat/nowhere")).await.unwrap();
    let status = response.status();
    let lines: Vec<String> = response.json().await.unwrap();
    let deleted = reqwest::Client::new()
        .delete(server.http_url("/chat/nowhere"))
        .send()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(status, reqwest::StatusCode::OK);
    assert!(lines.is_empty());
    assert_eq!(deleted.status(), reqwest::StatusCode::NO_CONTENT);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_chat_history_log_failure_is_500() {
    // テスト項目: ログの読み出しに失敗すると 500 とエラー本文が返る
    // given (前提条件):
    let server =
        TestServer::start_with_log(Arc::new(ManualClock::new(T0)), Arc::new(UnavailableLog))
            .await;

    // when (操作):
    let response = reqwest::get(server.http_url("/chat/r1")).await.unwrap();

    // then (期待する結果):
    assert_eq!(response.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().is_some_and(|e| e.contains("log is down")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_health_check() {
    // テスト項目: ヘルスチェックが {"status":"ok"} を返す
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let body: serde_json::Value = reqwest::get(server.http_url("/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(body, serde_json::json!({"status": "ok"}));
}
