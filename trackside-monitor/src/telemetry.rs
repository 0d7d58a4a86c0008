//! Logging setup.
//!
//! `RUST_LOG` wins over the configured level. An unparsable configured level
//! falls back to `info`. Logs go to stderr; stdout is left for reports.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use trackside_core::config::LoggingConfig;

/// Build the level filter for a logging config.
#[must_use]
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Returns `false` if one was already set.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let registry = tracing_subscriber::registry().with(build_filter(config));
    let installed = if config.json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init()
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).try_init()
    };
    match installed {
        Ok(()) => {
            tracing::debug!(level = %config.level, json = config.json, "tracing initialised");
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_reports_existing_subscriber() {
        let config = LoggingConfig::default();
        let _first = init_tracing(&config);
        assert!(!init_tracing(&config));
    }

    #[test]
    fn bad_level_still_builds_a_filter() {
        let config = LoggingConfig {
            level: "not a level [".to_string(),
            ..LoggingConfig::default()
        };
        let _filter = build_filter(&config);
    }
}
