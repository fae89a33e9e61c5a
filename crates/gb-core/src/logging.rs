//! Subscriber bootstrap for embedding applications.
//!
//! The library only emits `tracing` events. Hosts that do not install their
//! own subscriber can call [`init_logging`] once at startup.

use gb_config::LoggingSettings;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding filter directives, e.g. `gb_core=debug`.
pub const LOG_ENV: &str = "GB_LOG";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter {filter:?}: {message}")]
    Filter { filter: String, message: String },

    #[error("a global subscriber is already installed")]
    AlreadyInstalled,
}

/// Filter from `directives` when given, otherwise from the configured level.
pub fn build_filter(directives: Option<&str>, settings: &LoggingSettings) -> Result<EnvFilter, LoggingError> {
    let filter = directives.unwrap_or(&settings.level);
    EnvFilter::try_new(filter).map_err(|e| LoggingError::Filter {
        filter: filter.to_string(),
        message: e.to_string(),
    })
}

/// Install a global fmt subscriber. `GB_LOG` overrides the configured level.
pub fn init_logging(settings: &LoggingSettings) -> Result<(), LoggingError> {
    let directives = std::env::var(LOG_ENV).ok();
    let filter = build_filter(directives.as_deref(), settings)?;

    let json = settings.json.then(|| fmt::layer().json().with_target(true));
    let plain = (!settings.json).then(|| fmt::layer().with_target(true));

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(plain)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInstalled)
}
