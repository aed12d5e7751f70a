//! The `client` module defines the subscriber handle used by the broker.
//!
//! A `Client` is created by the transport when a connection is accepted and
//! dropped by it on disconnect. The broker only keeps a clone of the sending
//! half of the connection's outbound channel.

pub mod pubsub_client;
pub use pubsub_client::{Client, ClientId};
