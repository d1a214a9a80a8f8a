// Host-side tracing setup. The first call installs the subscriber; later calls are no-ops.

use std::sync::Once;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{EngineConfig, DEFAULT_LOG_FILTER};

static INIT_TRACING: Once = Once::new();

/// Install the global subscriber with the built-in filter.
pub fn init_tracing() {
    init_tracing_with(DEFAULT_LOG_FILTER);
}

/// Install the global subscriber with the filter from `config`.
pub fn init_tracing_for(config: &EngineConfig) {
    init_tracing_with(&config.log_filter);
}

/// Install the global subscriber. `RUST_LOG` overrides `default_filter` when set.
pub fn init_tracing_with(default_filter: &str) {
    INIT_TRACING.call_once(|| {
        let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        let (filter, rejected) = resolve_filter(env.as_deref(), default_filter);

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();

        if let Some(bad) = rejected {
            warn!("ignoring unparsable log filter {:?}", bad);
        }
        info!("gallery engine tracing initialized");
    });
}

/// Pick the first filter that parses: `env`, then `default_filter`, then `DEFAULT_LOG_FILTER`.
/// Also returns the first rejected directive string, if any.
fn resolve_filter(env: Option<&str>, default_filter: &str) -> (EnvFilter, Option<String>) {
    let mut rejected = None;
    for candidate in env.into_iter().chain([default_filter]) {
        match EnvFilter::try_new(candidate) {
            Ok(filter) => return (filter, rejected),
            Err(_) => {
                rejected.get_or_insert_with(|| candidate.to_string());
            }
        }
    }
    (EnvFilter::new(DEFAULT_LOG_FILTER), rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overrides_default_filter() {
        let (filter, rejected) = resolve_filter(Some("gallery_engine=trace"), "warn");
        assert!(filter.to_string().contains("gallery_engine=trace"));
        assert!(rejected.is_none());

        let (filter, _) = resolve_filter(None, "warn,gallery_engine=debug");
        assert!(filter.to_string().contains("gallery_engine=debug"));
    }

    #[test]
    fn test_unparsable_filter_falls_through() {
        let (filter, rejected) =
            resolve_filter(Some("gallery_engine=loud"), "gallery_engine=debug");
        assert!(filter.to_string().contains("gallery_engine=debug"));
        assert_eq!(rejected.as_deref(), Some("gallery_engine=loud"));

        let (filter, rejected) = resolve_filter(None, "gallery_engine=loud");
        assert!(filter.to_string().contains("reqwest=warn"));
        assert!(rejected.is_some());
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing_for(&EngineConfig::default());
        init_tracing_with("debug");
        init_tracing();
        tracing::debug!("still logging after repeated init");
    }
}
