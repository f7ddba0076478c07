//! End-to-end tests against a server bound to an ephemeral port.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::oneshot, time::timeout};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use utage_server::{
    config::TimingConfig,
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository},
    ui::{AppState, Server},
};

type Client = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Running server plus the trigger that stops it.
struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    async fn start() -> Self {
        let timing = TimingConfig {
            tick_interval: Duration::from_millis(100),
            ..TimingConfig::default()
        };
        let state = AppState::new(
            Arc::new(InMemoryRoomRepository::new()),
            Arc::new(WebSocketMessagePusher::new()),
            &timing,
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(Server::new(state).serve_with_shutdown(listener, async {
            let _ = rx.await;
        }));
        Self {
            addr,
            shutdown: Some(tx),
        }
    }

    async fn connect(&self) -> Client {
        let (ws, _) = connect_async(format!("ws://{}/ws", self.addr))
            .await
            .expect("Failed to connect");
        ws
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        reqwest::get(format!("http://{}{}", self.addr, path))
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn send(ws: &mut Client, frame: Value) {
    ws.send(Message::Text(frame.to_string().into())).await.unwrap();
}

/// Read frames until one with the given event name arrives.
async fn next_event(ws: &mut Client, event: &str) -> Value {
    timeout(Duration::from_secs(5), async {
        loop {
            let msg = ws.next().await.expect("stream ended").expect("read failed");
            if let Message::Text(text) = msg {
                let value: Value = serde_json::from_str(text.as_str()).unwrap();
                if value["event"] == event {
                    return value;
                }
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("no '{event}' frame within 5s"))
}

fn create_room(room_id: &str, name: &str, user_id: &str, user_name: &str) -> Value {
    json!({
        "event": "createRoom",
        "data": {
            "roomId": room_id,
            "name": name,
            "hostId": user_id,
            "user": { "id": user_id, "name": user_name }
        }
    })
}

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await;

    let response = server.get("/api/health").await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_room_lifecycle_over_websocket() {
    // given:
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;

    // when: alice creates a room
    send(&mut alice, create_room("r1", "Lobby", "u1", "Alice")).await;

    // then:
    let snapshot = next_event(&mut alice, "roomSnapshot").await;
    assert_eq!(snapshot["data"]["name"], "Lobby");
    assert_eq!(snapshot["data"]["users"][0]["controller"]["mic"], true);

    // when: bob browses the lobby and enters
    send(&mut bob, json!({ "event": "getRoomList" })).await;
    let list = next_event(&mut bob, "roomList").await;
    assert_eq!(list["data"][0]["roomId"], "r1");
    assert_eq!(list["data"][0]["userCount"], 1);

    send(
        &mut bob,
        json!({
            "event": "enterRoom",
            "data": { "roomId": "r1", "user": { "id": "u2", "name": "Bob" } }
        }),
    )
    .await;
    let snapshot = next_event(&mut bob, "roomSnapshot").await;
    assert_eq!(snapshot["data"]["users"].as_array().unwrap().len(), 2);

    // when: alice chats and passes the mic
    send(
        &mut alice,
        json!({
            "event": "chat",
            "data": { "roomId": "r1", "user": "Alice", "message": "hello", "color": "#f00" }
        }),
    )
    .await;
    send(
        &mut alice,
        json!({ "event": "passMic", "data": { "roomId": "r1", "from": "u1", "to": "u2" } }),
    )
    .await;

    // then: bob is told and sees the new holder along with the chat
    let received = next_event(&mut bob, "micReceived").await;
    assert_eq!(received["data"], json!({ "roomId": "r1", "from": "u1" }));
    let snapshot = next_event(&mut bob, "roomSnapshot").await;
    assert_eq!(snapshot["data"]["users"][1]["controller"]["mic"], true);
    assert_eq!(snapshot["data"]["chat"][0]["message"], "hello");

    // then: the HTTP view agrees
    let rooms: Value = server.get("/api/rooms").await.json().await.unwrap();
    assert_eq!(rooms[0]["id"], "r1");
    assert_eq!(rooms[0]["users"], json!(["u1", "u2"]));
    let detail: Value = server.get("/api/rooms/r1").await.json().await.unwrap();
    assert_eq!(detail["chat"][0]["user"], "Alice");
}

#[tokio::test]
async fn test_closing_the_socket_releases_the_user() {
    // given:
    let server = TestServer::start().await;
    let mut alice = server.connect().await;
    let mut bob = server.connect().await;
    send(&mut alice, create_room("r1", "Lobby", "u1", "Alice")).await;
    next_event(&mut alice, "roomSnapshot").await;
    send(
        &mut bob,
        json!({
            "event": "enterRoom",
            "data": { "roomId": "r1", "user": { "id": "u2", "name": "Bob" } }
        }),
    )
    .await;
    next_event(&mut bob, "roomSnapshot").await;

    // when:
    alice.close(None).await.unwrap();

    // then: bob becomes host with a single user left
    let remaining = timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = next_event(&mut bob, "roomSnapshot").await;
            if snapshot["data"]["users"].as_array().unwrap().len() == 1 {
                return snapshot;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(remaining["data"]["hostId"], "u2");
}

#[tokio::test]
async fn test_errors_are_reported_without_closing() {
    // given:
    let server = TestServer::start().await;
    let mut alice = server.connect().await;

    // when:
    alice
        .send(Message::Text("{not json".to_string().into()))
        .await
        .unwrap();
    let malformed = next_event(&mut alice, "error").await;
    send(
        &mut alice,
        json!({
            "event": "enterRoom",
            "data": { "roomId": "nope", "user": { "id": "u1", "name": "Alice" } }
        }),
    )
    .await;
    let missing = next_event(&mut alice, "error").await;

    // then:
    assert_eq!(malformed["data"]["code"], "validation");
    assert_eq!(missing["data"]["code"], "notFound");
    assert_eq!(server.get("/api/rooms/nope").await.status(), 404);

    // then: the connection still works
    send(&mut alice, create_room("r1", "Lobby", "u1", "Alice")).await;
    next_event(&mut alice, "roomSnapshot").await;
}
