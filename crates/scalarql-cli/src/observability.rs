// Logging for the CLI. Events go to stderr; stdout is reserved for the
// response document.
use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*, reload};

/// Level used until the configuration has been read.
const STARTUP_LEVEL: &str = "warn";

/// Set only when `RUST_LOG` is absent, so the configured level can take over.
static LEVEL_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

pub fn init_tracing() {
    let env = std::env::var("RUST_LOG").ok();
    let pinned = env.is_some();
    let (layer, handle) = reload::Layer::new(build_filter(env.as_deref(), STARTUP_LEVEL));
    if !pinned {
        let _ = LEVEL_HANDLE.set(handle);
    }

    let _ = tracing_subscriber::registry()
        .with(layer)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Switches to the configured level. A no-op when `RUST_LOG` pinned the filter.
pub fn set_level(level: &str) {
    if let Some(handle) = LEVEL_HANDLE.get() {
        if let Err(e) = handle.reload(build_filter(None, level)) {
            tracing::warn!(error = %e, level, "Failed to apply log level");
        }
    }
}

/// `RUST_LOG` wins when it parses; otherwise `level`, then the startup level.
fn build_filter(env: Option<&str>, level: &str) -> EnvFilter {
    env.and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new(STARTUP_LEVEL))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_directives_take_precedence() {
        let filter = build_filter(Some("scalarql_graphql=trace"), "info");
        assert_eq!(filter.to_string(), "scalarql_graphql=trace");
    }

    #[test]
    fn test_configured_level_used_without_env() {
        assert_eq!(build_filter(None, "debug").to_string(), "debug");
    }

    #[test]
    fn test_unparsable_level_falls_back() {
        assert_eq!(build_filter(None, "scalarql=loud").to_string(), STARTUP_LEVEL);
        assert_eq!(build_filter(Some("scalarql=verbose"), "info").to_string(), "info");
    }
}
