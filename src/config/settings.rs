use std::time::Duration;

use serde::Deserialize;

use crate::utils::{Error, Result};

/// Top-level configuration settings for the application.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub server: ServerSettings,
    pub timer: TimerSettings,
    pub logging: LoggingSettings,
}

/// Where the WebSocket server binds.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Countdown parameters shared by every session timer.
///
/// `start_seconds` is the value a freshly (re)started countdown begins at;
/// the first tick publishes `start_seconds - 1`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TimerSettings {
    pub start_seconds: u32,
    pub tick_interval_ms: u64,
}

impl TimerSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Rejects values a countdown cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.start_seconds == 0 {
            return Err(Error::InvalidConfig(
                "timer.start_seconds must be at least 1".to_string(),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "timer.tick_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from `Settings::default()`.
#[derive(Debug, Deserialize, Default)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub timer: Option<PartialTimerSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct PartialTimerSettings {
    pub start_seconds: Option<u32>,
    pub tick_interval_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            timer: TimerSettings {
                start_seconds: 10,
                tick_interval_ms: 1000,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Settings::default().timer
    }
}

impl PartialSettings {
    /// Overlay whatever was provided on top of the defaults.
    pub fn merge_with_defaults(self) -> Settings {
        let default = Settings::default();

        Settings {
            server: ServerSettings {
                host: self
                    .server
                    .as_ref()
                    .and_then(|s| s.host.clone())
                    .unwrap_or(default.server.host),
                port: self
                    .server
                    .as_ref()
                    .and_then(|s| s.port)
                    .unwrap_or(default.server.port),
            },
            timer: TimerSettings {
                start_seconds: self
                    .timer
                    .as_ref()
                    .and_then(|t| t.start_seconds)
                    .unwrap_or(default.timer.start_seconds),
                tick_interval_ms: self
                    .timer
                    .as_ref()
                    .and_then(|t| t.tick_interval_ms)
                    .unwrap_or(default.timer.tick_interval_ms),
            },
            logging: LoggingSettings {
                level: self
                    .logging
                    .and_then(|l| l.level)
                    .unwrap_or(default.logging.level),
            },
        }
    }
}
