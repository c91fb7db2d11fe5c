// Tracing initialization with configurable level and output format.
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::{LogFormat, LoggingConfig};

pub fn init_tracing(logging: &LoggingConfig) {
    init_tracing_with(&logging.level, logging.format);
}

pub fn init_tracing_with(level: &str, format: LogFormat) {
    let filter = build_filter(std::env::var("RUST_LOG").ok().as_deref(), level);

    let registry = tracing_subscriber::registry().with(filter);
    let _ = match format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Text => registry.with(fmt::layer()).try_init(),
    };
}

/// Prefer a valid RUST_LOG directive, otherwise use the configured level.
fn build_filter(rust_log: Option<&str>, level: &str) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_wins_over_configured_level() {
        let filter = build_filter(Some("warn,xbuckets=trace"), "info");
        let rendered = filter.to_string();
        assert!(rendered.contains("xbuckets=trace"));
        assert!(rendered.contains("warn"));
        assert!(!rendered.contains("info"));
    }

    #[test]
    fn configured_level_used_without_rust_log() {
        let filter = build_filter(None, "debug");
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn invalid_rust_log_falls_back() {
        let filter = build_filter(Some("xbuckets=notalevel"), "error");
        assert_eq!(filter.to_string(), "error");
    }

    #[test]
    fn init_twice_does_not_panic() {
        init_tracing(&LoggingConfig::default());
        init_tracing_with("debug", LogFormat::Json);
    }
}
