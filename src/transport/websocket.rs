//! WebSocket transport
//!
//! Accepts connections, gives each one a `Client` registered with the
//! broker, and turns JSON frames into broker and session operations.
//! Each connection runs two loops: a write loop draining the client's
//! outbound channel into the socket, and the read loop below. When either
//! side ends, the client is removed from the broker along with every
//! subscription it held.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tracing::{debug, error, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::{Broker, Channel, topic_for};
use crate::client::Client;
use crate::session::SessionRouter;
use crate::transport::message::{ClientMessage, ServerMessage};
use crate::utils::Result;

/// Binds `addr` and serves connections until the listener fails.
pub async fn start_websocket_server(
    addr: &str,
    broker: Arc<Broker>,
    router: SessionRouter,
) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve(listener, broker, router).await
}

/// Serves connections from an already bound listener.
pub async fn serve(listener: TcpListener, broker: Arc<Broker>, router: SessionRouter) -> Result<()> {
    info!("WebSocket server listening on ws://{}", listener.local_addr()?);

    loop {
        let (stream, peer) = listener.accept().await?;
        debug!(%peer, "accepted connection");
        tokio::spawn(handle_connection(stream, broker.clone(), router.clone()));
    }
}

async fn handle_connection(stream: TcpStream, broker: Arc<Broker>, router: SessionRouter) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake error: {e}");
            return;
        }
    };
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
    let client = Client::new(tx);
    let client_id = client.id.clone();
    broker.register_client(client.clone());
    info!(%client_id, "client connected");

    let cleanup_called = Arc::new(AtomicBool::new(false));
    let do_cleanup = {
        let broker = broker.clone();
        let client_id = client_id.clone();
        let cleanup_called = cleanup_called.clone();

        move || {
            if !cleanup_called.swap(true, Ordering::SeqCst) {
                broker.cleanup_client(&client_id);
            }
        }
    };

    {
        let client_id = client_id.clone();
        let do_cleanup = do_cleanup.clone();

        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if let Err(e) = ws_sender.send(msg).await {
                    warn!(%client_id, "failed to send message: {e}");
                    break;
                }
            }

            do_cleanup();
            debug!(%client_id, "send loop closed");
        });
    }

    while let Some(frame) = ws_receiver.next().await {
        // the send loop already cleaned up; stop dispatching for this client
        if cleanup_called.load(Ordering::SeqCst) {
            break;
        }
        let msg = match frame {
            Ok(msg) => msg,
            Err(e) => {
                debug!(%client_id, "read error: {e}");
                break;
            }
        };
        if msg.is_close() {
            break;
        }
        if let WsMessage::Text(text) = &msg {
            handle_text(&broker, &router, &client, text.as_str());
        }
    }

    do_cleanup();
    info!(%client_id, "client disconnected");
}

/// Parses one text frame and applies it; parse failures are answered with
/// an error reply on the same connection.
pub fn handle_text(broker: &Broker, router: &SessionRouter, client: &Client, text: &str) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => {
            if let Some(reply) = handle_client_message(broker, router, &client.id, msg) {
                reply_to(client, &reply);
            }
        }
        Err(err) => {
            warn!(
                client_id = %client.id,
                "invalid client message: {err} | {}",
                text.chars().take(100).collect::<String>()
            );
            reply_to(
                client,
                &ServerMessage::Error {
                    message: format!("invalid message: {err}"),
                },
            );
        }
    }
}

/// Applies a decoded client message. Returns the reply for the sender, if any.
pub fn handle_client_message(
    broker: &Broker,
    router: &SessionRouter,
    client_id: &str,
    msg: ClientMessage,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::Subscribe { topic } => {
            broker.subscribe(&topic, client_id.to_string());
        }
        ClientMessage::Unsubscribe { topic } => {
            broker.unsubscribe(&topic, client_id);
        }
        ClientMessage::Join { session_id } => {
            for channel in Channel::ALL {
                broker.subscribe(&topic_for(&session_id, channel), client_id.to_string());
            }
            info!(client_id, %session_id, "joined session");
        }
        ClientMessage::Leave { session_id } => {
            for channel in Channel::ALL {
                broker.unsubscribe(&topic_for(&session_id, channel), client_id);
            }
            info!(client_id, %session_id, "left session");
        }
        ClientMessage::StartGame { session_id } => {
            router.on_start_game(&session_id);
        }
        ClientMessage::CancelGame { session_id } => {
            router.on_cancel_game(&session_id);
        }
        ClientMessage::Chat {
            session_id,
            content,
        } => {
            router.on_chat_message(&session_id, content);
        }
        ClientMessage::Ping {} => return Some(ServerMessage::Pong {}),
    }
    None
}

fn reply_to(client: &Client, reply: &ServerMessage) {
    match serde_json::to_string(reply) {
        Ok(json) => {
            if !client.send(WsMessage::text(json)) {
                debug!(client_id = %client.id, "reply dropped, connection closed");
            }
        }
        Err(e) => error!("failed to serialize reply: {e}"),
    }
}
