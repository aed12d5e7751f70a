use tokio::sync::mpsc::UnboundedSender;
use tungstenite::protocol::Message as WsMessage;
use uuid::Uuid;

pub type ClientId = String;

/// A connected subscriber.
///
/// `sender` feeds the connection's write loop; a send error means the
/// connection has already gone away.
#[derive(Debug, Clone)]
pub struct Client {
    /// Unique identifier for the client (`client-<uuid>`).
    pub id: ClientId,

    /// Channel to send WebSocket messages to the client.
    pub sender: UnboundedSender<WsMessage>,
}

impl Client {
    /// Create a new client with a freshly generated id.
    pub fn new(sender: UnboundedSender<WsMessage>) -> Self {
        Self {
            id: format!("client-{}", Uuid::new_v4()),
            sender,
        }
    }

    /// Queue a frame for the connection. Returns `false` if the connection is closed.
    pub fn send(&self, msg: WsMessage) -> bool {
        self.sender.send(msg).is_ok()
    }
}
