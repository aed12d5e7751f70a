use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Builds the log filter: `RUST_LOG` directives when set, otherwise the
/// configured level. An unrecognised level falls back to `info`.
pub fn filter_for(level: &str) -> EnvFilter {
    let default = level.trim().parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
    EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy()
}

/// Installs the global fmt subscriber. Later calls are no-ops.
pub fn init(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_for(level))
        .with_target(false)
        .try_init();
}
