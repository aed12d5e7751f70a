//! The `utils` module provides shared pieces used across `lobbycast`:
//! the crate error type and the logging bootstrap.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
