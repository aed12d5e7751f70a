//! # lobbycast
//!
//! `lobbycast` is the real-time core of a game lobby service: a per-session
//! countdown timer and a topic based publish/subscribe fan-out, served to
//! clients over WebSockets.
//!
//! ## Core Modules
//!
//! - `broker`: topic registry, outbound message envelope and fan-out.
//! - `client`: the subscriber handle of a connected client.
//! - `timer`: per-session countdowns and the scheduler they run on.
//! - `session`: entry points for start/cancel game and chat.
//! - `config`: settings loading.
//! - `transport`: the WebSocket server and its JSON protocol.
//! - `utils`: error type and logging.

pub mod broker;
pub mod client;
pub mod config;
pub mod session;
pub mod timer;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod test_support;
