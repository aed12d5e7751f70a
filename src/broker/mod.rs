//! Topic registry and fan-out.

pub mod engine;
pub mod message;
pub mod registry;
pub mod topic;

pub use engine::{Broadcaster, Broker};
pub use message::{EXPIRY_NOTICE, Message, Payload};
pub use registry::TopicRegistry;
pub use topic::{Channel, Topic, topic_for};
