use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use lobbycast::broker::{Broker, EXPIRY_NOTICE};
use lobbycast::config::TimerSettings;
use lobbycast::session::SessionRouter;
use lobbycast::timer::{CountdownTimer, TokioScheduler};
use lobbycast::transport::serve;
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server(settings: TimerSettings) -> (String, Arc<Broker>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let broker = Arc::new(Broker::new());
    let timer = CountdownTimer::new(
        broker.clone(),
        Arc::new(TokioScheduler::current()),
        settings,
    )
    .unwrap();
    let router = SessionRouter::new(timer, broker.clone());
    tokio::spawn(serve(listener, broker.clone(), router));

    (format!("ws://{addr}"), broker)
}

async fn send(ws: &mut Ws, frame: Value) {
    ws.send(WsMessage::Text(frame.to_string().into()))
        .await
        .expect("send frame");
}

async fn recv(ws: &mut Ws) -> Value {
    loop {
        let frame = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("read error");
        if let WsMessage::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

/// Joins `session_id` and waits until the server has processed it.
async fn join(ws: &mut Ws, session_id: &str) {
    send(ws, json!({"type": "join", "session_id": session_id})).await;
    send(ws, json!({"type": "ping"})).await;
    assert_eq!(recv(ws).await, json!({"type": "pong"}));
}

#[tokio::test]
async fn chat_and_countdown_reach_session_members() {
    let (url, _broker) = start_server(TimerSettings {
        start_seconds: 3,
        tick_interval_ms: 50,
    })
    .await;

    let (mut host, _) = connect_async(url.as_str()).await.expect("host connect");
    let (mut guest, _) = connect_async(url.as_str()).await.expect("guest connect");
    let (mut other, _) = connect_async(url.as_str()).await.expect("other connect");
    join(&mut host, "lobby-1").await;
    join(&mut guest, "lobby-1").await;
    join(&mut other, "lobby-2").await;

    send(
        &mut host,
        json!({"type": "chat", "session_id": "lobby-1", "content": {"text": "ready?"}}),
    )
    .await;
    let chat = recv(&mut guest).await;
    assert_eq!(chat["topic"], "lobby-1/chat");
    assert_eq!(chat["payload"], json!({"text": "ready?"}));

    send(&mut host, json!({"type": "start_game", "session_id": "lobby-1"})).await;

    let mut ticks = Vec::new();
    let notice = loop {
        let msg = recv(&mut guest).await;
        match msg["topic"].as_str() {
            Some("lobby-1/timer") => ticks.push(msg["payload"].as_u64().unwrap()),
            Some("lobby-1/timerNotification") => break msg,
            other => panic!("unexpected topic {other:?}"),
        }
    };
    assert_eq!(ticks, vec![2, 1, 0]);
    assert_eq!(notice["payload"], EXPIRY_NOTICE);

    // nothing from lobby-1 leaked to lobby-2
    send(&mut other, json!({"type": "ping"})).await;
    assert_eq!(recv(&mut other).await, json!({"type": "pong"}));
}

#[tokio::test]
async fn disconnect_removes_subscriptions() {
    let (url, broker) = start_server(TimerSettings::default()).await;

    let (mut ws, _) = connect_async(url.as_str()).await.expect("connect");
    join(&mut ws, "lobby-9").await;
    assert_eq!(broker.subscriber_count("lobby-9/chat"), 1);

    ws.close(None).await.expect("close");
    drop(ws);

    let cleaned = async {
        while broker.subscriber_count("lobby-9/chat") != 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    timeout(Duration::from_secs(5), cleaned)
        .await
        .expect("client was not cleaned up");
}

#[tokio::test]
async fn malformed_frame_gets_error_and_connection_survives() {
    let (url, _broker) = start_server(TimerSettings::default()).await;
    let (mut ws, _) = connect_async(url.as_str()).await.expect("connect");

    ws.send(WsMessage::Text("{not json".to_string().into())).await.unwrap();
    let reply = recv(&mut ws).await;
    assert_eq!(reply["type"], "error");

    send(&mut ws, json!({"type": "ping"})).await;
    assert_eq!(recv(&mut ws).await, json!({"type": "pong"}));
}
