use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::broker::{Broadcaster, Channel, Payload, topic_for};
use crate::timer::CountdownTimer;

/// Routes inbound session events to the countdown timer or straight to the
/// broadcaster.
///
/// Session ids come from the caller as-is; they are never validated here.
#[derive(Clone)]
pub struct SessionRouter {
    timer: CountdownTimer,
    broadcaster: Arc<dyn Broadcaster>,
}

impl SessionRouter {
    pub fn new(timer: CountdownTimer, broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self { timer, broadcaster }
    }

    /// (Re)starts the session's countdown.
    pub fn on_start_game(&self, session_id: &str) {
        self.timer.start(session_id);
    }

    pub fn on_cancel_game(&self, session_id: &str) {
        self.timer.cancel(session_id);
    }

    /// Forwards `content` unmodified to the session's chat topic.
    pub fn on_chat_message(&self, session_id: &str, content: Value) {
        let topic = topic_for(session_id, Channel::Chat);
        debug!(session_id, %topic, "chat message");
        self.broadcaster.publish(&topic, Payload::Chat(content));
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }
}
