//! Settings loading.
//!
//! Sources, lowest precedence first: built-in defaults, the optional
//! `config/default.*` file, then `LOBBYCAST_*` environment variables using
//! `__` as the nesting separator (`LOBBYCAST_TIMER__START_SECONDS=30`).

mod settings;

use config::{Config, Environment, File};

use crate::utils::Result;

pub use settings::{LoggingSettings, PartialSettings, ServerSettings, Settings, TimerSettings};

const ENV_PREFIX: &str = "LOBBYCAST";

/// Loads the configuration from the default file and environment variables
/// and merges it over the defaults.
pub fn load_config() -> Result<Settings> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

    let config = builder.build()?;
    let partial: PartialSettings = config.try_deserialize()?;
    let settings = partial.merge_with_defaults();

    validate(&settings)?;
    Ok(settings)
}

/// Rejects settings the service cannot run with.
pub fn validate(settings: &Settings) -> Result<()> {
    settings.timer.validate()
}
