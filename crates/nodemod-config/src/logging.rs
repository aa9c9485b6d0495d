//! Centralized logging initialization with environment variable support

use crate::config::{AppConfig, LogFormat};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing subscriber with environment variable support
///
/// Environment variables (in priority order):
/// - `RUST_LOG`: Standard Rust log filter (takes precedence over all)
/// - `LOG_LEVEL`: Set log level (trace, debug, info, warn, error)
/// - `LOG_FORMAT`: Override format (json, pretty)
///
/// # Examples
///
/// ```bash
/// # See every skipped node
/// LOG_LEVEL=debug nodemod run util-is src/
///
/// # Machine-readable logs in CI
/// LOG_FORMAT=json nodemod run rmdir .
///
/// # Module-specific filtering
/// RUST_LOG=nodemod_recipes=trace nodemod run chalk-to-util-styletext .
/// ```
pub fn initialize(config: &AppConfig) {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| config.logging.level.clone());
    let log_level = level.parse().unwrap_or(tracing::Level::INFO);

    // RUST_LOG directives are read first, the level acts as the default directive
    let env_filter = EnvFilter::from_default_env().add_directive(log_level.into());

    let format = std::env::var("LOG_FORMAT")
        .ok()
        .and_then(|f| match f.to_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "pretty" | "human" => Some(LogFormat::Pretty),
            _ => None,
        })
        .unwrap_or_else(|| config.logging.format.clone());

    // Always write to stderr to keep stdout for reports
    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Create a span for one file processed by a recipe
///
/// Every log emitted while transforming the file carries the recipe and path.
pub fn file_span(recipe: &str, path: &str) -> tracing::Span {
    tracing::info_span!("file", recipe = %recipe, path = %path)
}
