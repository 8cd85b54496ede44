//! Tracing subscriber initialisation.
//!
//! Only this crate installs a subscriber; `stackforge-core` and
//! `stackforge-generators` only emit spans and events.
//!
//! `RUST_LOG` overrides the configured level if set.

use std::io::IsTerminal as _;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogConfig;

const CRATES: &[&str] = &["stackforge", "stackforge_core", "stackforge_generators"];

/// Initialise the global tracing subscriber.
///
/// Returns an error if the configured level is not a valid filter or a
/// subscriber is already installed in this process.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(directives(&config.level))
            .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {e}", config.level))?,
    };
    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(std::io::stderr().is_terminal())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))
}

/// One directive per engine crate at `level`.
fn directives(level: &str) -> String {
    CRATES
        .iter()
        .map(|c| format!("{c}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_engine_crate_gets_the_level() {
        assert_eq!(
            directives("debug"),
            "stackforge=debug,stackforge_core=debug,stackforge_generators=debug"
        );
    }

    #[test]
    fn directives_parse_as_a_filter() {
        assert!(EnvFilter::try_new(directives("info")).is_ok());
    }
}
