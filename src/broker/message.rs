//! Outbound message envelope
//!
//! Every frame the broker delivers is the JSON form of `Message`:
//! `{"topic": ..., "payload": ..., "timestamp": ...}`. The payload shape is
//! determined by the topic's channel: a bare integer on `timer`, the fixed
//! expiry string on `timerNotification`, and whatever the sender supplied on
//! `chat`. The envelope is write-only: a chat payload of `5` or `"hi"` is
//! indistinguishable on the wire from a tick or a notice, so there is no
//! `Deserialize` impl; readers decode by topic.

use serde::Serialize;
use serde_json::Value;

/// Text published on a session's notification topic when its countdown completes.
pub const EXPIRY_NOTICE: &str = "Timer has expired!";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// Remaining seconds after a tick.
    Tick(u32),
    /// Expiry notice; always `EXPIRY_NOTICE` when produced by the timer.
    Notice(String),
    /// Chat/game content, passed through unmodified.
    Chat(Value),
}

impl Payload {
    pub fn expired() -> Self {
        Payload::Notice(EXPIRY_NOTICE.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub topic: String,
    pub payload: Payload,
    /// Milliseconds since the UNIX epoch, stamped at publish time.
    pub timestamp: i64,
}

impl Message {
    pub fn new(topic: impl Into<String>, payload: Payload) -> Self {
        Self {
            topic: topic.into(),
            payload,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}
