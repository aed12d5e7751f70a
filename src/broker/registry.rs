//! Topic registry
//!
//! Pure bookkeeping: which clients are connected and which topics each of
//! them listens on. The registry never creates or tears down connections;
//! the transport registers a client on connect and cleans it up on
//! disconnect.
//!
//! `TopicRegistry` itself is not synchronized. The broker owns it behind a
//! read/write lock so that publishers always read a consistent snapshot.

use std::collections::HashMap;

use crate::broker::topic::Topic;
use crate::client::{Client, ClientId};

#[derive(Debug, Default)]
pub struct TopicRegistry {
    pub(crate) topics: HashMap<String, Topic>,
    pub(crate) clients: HashMap<ClientId, Client>,
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_client(&mut self, client: Client) {
        self.clients.insert(client.id.clone(), client);
    }

    pub fn remove_client(&mut self, client_id: &str) -> Option<Client> {
        self.clients.remove(client_id)
    }

    /// Adds `subscriber` to `topic`, creating the topic on first use.
    /// Returns `false` if it was already subscribed.
    pub fn subscribe(&mut self, topic: &str, subscriber: ClientId) -> bool {
        self.topics
            .entry(topic.to_string())
            .or_insert_with(|| Topic::new(topic))
            .subscribe(subscriber)
    }

    /// Removes `subscriber` from `topic`. Empty topics are dropped.
    /// Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, topic: &str, subscriber: &str) -> bool {
        let Some(t) = self.topics.get_mut(topic) else {
            return false;
        };
        let removed = t.unsubscribe(subscriber);
        if t.is_empty() {
            self.topics.remove(topic);
        }
        removed
    }

    /// Handles of every registered client currently subscribed to `topic`.
    ///
    /// Subscribed ids without a registered client are skipped.
    pub fn subscribers_of(&self, topic: &str) -> Vec<Client> {
        let Some(t) = self.topics.get(topic) else {
            return Vec::new();
        };
        t.subscribers
            .iter()
            .filter_map(|id| self.clients.get(id))
            .cloned()
            .collect()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.get(topic).map_or(0, |t| t.subscribers.len())
    }

    pub fn is_registered(&self, client_id: &str) -> bool {
        self.clients.contains_key(client_id)
    }

    /// Removes the client and all of its subscriptions. Returns the topics it
    /// was unsubscribed from.
    pub fn cleanup_client(&mut self, client_id: &str) -> Vec<String> {
        self.remove_client(client_id);

        let mut left = Vec::new();
        self.topics.retain(|name, topic| {
            if topic.unsubscribe(client_id) {
                left.push(name.clone());
            }
            !topic.is_empty()
        });
        left
    }
}
