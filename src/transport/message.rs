use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Frames a client may send, tagged by `"type"`.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "subscribe")]
    Subscribe { topic: String },
    #[serde(rename = "unsubscribe")]
    Unsubscribe { topic: String },
    /// Subscribe to the timer, notification and chat topics of a session.
    #[serde(rename = "join")]
    Join { session_id: String },
    #[serde(rename = "leave")]
    Leave { session_id: String },
    #[serde(rename = "start_game")]
    StartGame { session_id: String },
    #[serde(rename = "cancel_game")]
    CancelGame { session_id: String },
    #[serde(rename = "chat")]
    Chat { session_id: String, content: Value },
    #[serde(rename = "ping")]
    Ping {},
}

/// Replies sent to the originating connection only. Broadcasts use
/// `broker::Message`.
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "pong")]
    Pong {},
    #[serde(rename = "error")]
    Error { message: String },
}
