//! Broker engine
//!
//! The broker owns the topic registry and fans published messages out to the
//! subscribers of a topic. Concurrency and usage notes:
//! - All methods take `&self`; the registry sits behind a read/write lock so
//!   the broker can be shared as `Arc<Broker>` between connection tasks and
//!   timer ticks.
//! - `publish` snapshots the subscriber set under the read lock and sends
//!   after releasing it. A client that disconnects mid-publish may or may
//!   not get that message; the registry itself is never left half-updated.
//! - Delivery is fire-and-forget onto each client's unbounded channel, so
//!   messages from one publisher to one topic arrive in publish order.

use parking_lot::RwLock;
use tracing::{debug, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::message::{Message, Payload};
use crate::broker::registry::TopicRegistry;
use crate::client::{Client, ClientId};

/// Capability to deliver a payload to every current subscriber of a topic.
///
/// Publishing to a topic with no subscribers is a successful no-op.
pub trait Broadcaster: Send + Sync {
    fn publish(&self, topic: &str, payload: Payload);
}

#[derive(Debug, Default)]
pub struct Broker {
    registry: RwLock<TopicRegistry>,
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_client(&self, client: Client) {
        debug!(client_id = %client.id, "client registered");
        self.registry.write().register_client(client);
    }

    pub fn remove_client(&self, client_id: &str) {
        self.registry.write().remove_client(client_id);
    }

    /// Subscribes a registered client. Requests from ids that were never
    /// registered, or were already cleaned up, are ignored.
    pub fn subscribe(&self, topic: &str, subscriber: ClientId) {
        let client_id = subscriber.clone();
        let mut registry = self.registry.write();
        if !registry.is_registered(&client_id) {
            debug!(%client_id, topic, "ignoring subscribe from unregistered client");
            return;
        }
        if registry.subscribe(topic, subscriber) {
            debug!(%client_id, topic, "subscribed");
        }
    }

    pub fn unsubscribe(&self, topic: &str, subscriber: &str) {
        if self.registry.write().unsubscribe(topic, subscriber) {
            debug!(client_id = subscriber, topic, "unsubscribed");
        }
    }

    /// Removes a client and every subscription it holds.
    pub fn cleanup_client(&self, client_id: &str) {
        let topics = self.registry.write().cleanup_client(client_id);
        debug!(client_id, topics = topics.len(), "cleaned up client");
    }

    pub fn subscribers_of(&self, topic: &str) -> Vec<Client> {
        self.registry.read().subscribers_of(topic)
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.registry.read().subscriber_count(topic)
    }

    pub fn is_registered(&self, client_id: &str) -> bool {
        self.registry.read().is_registered(client_id)
    }

    /// Serializes `msg` once and queues it on every subscriber of its topic.
    /// Returns the number of subscribers it was handed to.
    pub fn publish_message(&self, msg: &Message) -> usize {
        let subscribers = self.subscribers_of(&msg.topic);
        if subscribers.is_empty() {
            debug!(topic = %msg.topic, "no subscribers");
            return 0;
        }

        let text = match serde_json::to_string(msg) {
            Ok(json) => json,
            Err(e) => {
                warn!(topic = %msg.topic, error = %e, "failed to serialize message");
                return 0;
            }
        };
        let ws_msg = WsMessage::text(text);

        let mut delivered = 0;
        for client in &subscribers {
            if client.send(ws_msg.clone()) {
                delivered += 1;
            } else {
                warn!(client_id = %client.id, topic = %msg.topic, "failed to send to client");
            }
        }
        delivered
    }
}

impl Broadcaster for Broker {
    fn publish(&self, topic: &str, payload: Payload) {
        self.publish_message(&Message::new(topic, payload));
    }
}
