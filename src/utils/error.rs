//! The `error` module defines the error type returned by the fallible parts
//! of `lobbycast`: configuration loading and the network listener.
//!
//! The timer and broadcast core never fail; delivery problems are logged and
//! dropped at the transport boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
