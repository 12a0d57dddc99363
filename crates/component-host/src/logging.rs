//! Log subscriber setup for hosts embedding the registry.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! host's choice. These helpers give the conventional setup: filter from
//! [`env_vars::LOG_FILTER`](crate::config::env_vars::LOG_FILTER), falling back
//! to `RUST_LOG`, then [`DEFAULT_FILTER`]; JSON lines when
//! [`env_vars::LOG_JSON`](crate::config::env_vars::LOG_JSON) is `true`.

use tracing_subscriber::EnvFilter;

use crate::config::env_vars;

/// Filter used when no environment override is present.
pub const DEFAULT_FILTER: &str = "component_host=info";

/// Error returned when a global subscriber is already installed.
pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Build the filter from the environment.
pub fn env_filter() -> EnvFilter {
    std::env::var(env_vars::LOG_FILTER)
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

fn json_requested() -> bool {
    std::env::var(env_vars::LOG_JSON)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false)
}

/// Install the global subscriber.
pub fn try_init() -> Result<(), InitError> {
    let filter = env_filter();

    if json_requested() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init()
    }
}

/// Install the global subscriber, ignoring an already installed one.
pub fn init() {
    let _ = try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        // A second install is rejected rather than panicking.
        assert!(try_init().is_err());
    }
}
