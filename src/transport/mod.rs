//! The `transport` module owns the network edge: the JSON protocol spoken
//! over WebSockets and the server that maps frames onto broker and session
//! operations. Subscriber lifecycle (connect, disconnect) lives here.

pub mod message;
pub mod websocket;

pub use message::{ClientMessage, ServerMessage};
pub use websocket::{serve, start_websocket_server};
