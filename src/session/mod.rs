//! Session entry points: the operations the transport triggers for a game session.

pub mod router;

pub use router::SessionRouter;
