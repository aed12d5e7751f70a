//! Topic management
//!
//! A `Topic` holds the set of subscriber ids for one topic name. Topic names
//! for session traffic are derived from the session id and a `Channel`:
//! `<session_id>/timer`, `<session_id>/timerNotification`, `<session_id>/chat`.
//!
//! Concurrency note: callers must synchronize access to `Topic` (the broker
//! keeps every topic behind its registry lock).

use std::collections::HashSet;
use std::fmt;

use crate::client::ClientId;

/// The per-session sub-channels a session publishes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Countdown ticks, payload is the remaining seconds.
    Timer,
    /// The one-shot expiry notice of a completed countdown.
    TimerNotification,
    /// Chat and game messages, forwarded verbatim.
    Chat,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Timer, Channel::TimerNotification, Channel::Chat];

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Timer => "timer",
            Channel::TimerNotification => "timerNotification",
            Channel::Chat => "chat",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Topic name for `channel` of `session_id`.
pub fn topic_for(session_id: &str, channel: Channel) -> String {
    format!("{session_id}/{channel}")
}

#[derive(Debug, Default)]
pub struct Topic {
    pub name: String,
    pub subscribers: HashSet<ClientId>,
}

impl Topic {
    /// Create a new topic with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscribers: HashSet::new(),
        }
    }

    /// Add a subscriber to the topic. Duplicate adds are ignored.
    pub fn subscribe(&mut self, id: ClientId) -> bool {
        self.subscribers.insert(id)
    }

    /// Remove a subscriber from the topic. Removing an absent id is a no-op.
    pub fn unsubscribe(&mut self, id: &str) -> bool {
        self.subscribers.remove(id)
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
