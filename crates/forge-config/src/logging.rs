//! Centralized logging initialization with environment variable support

use crate::{AppConfig, LogFormat};
use forge_foundation::{ForgeError, ForgeResult};
use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing subscriber with environment variable support
///
/// Environment variables (in priority order):
/// - `RUST_LOG`: Standard Rust log filter (takes precedence over all)
/// - `LOG_FORMAT`: Override format (json, pretty)
///
/// # Examples
///
/// ```bash
/// # Debug logging for the merge step only
/// RUST_LOG=forge_generator::merger=debug itemforge generate
///
/// # Structured logs for CI
/// LOG_FORMAT=json itemforge check
/// ```
pub fn initialize(config: &AppConfig) -> ForgeResult<()> {
    let log_level = config
        .logging
        .level
        .parse()
        .unwrap_or(tracing::Level::INFO);

    // RUST_LOG directives win over the configured level
    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let format = std::env::var("LOG_FORMAT")
        .ok()
        .and_then(|f| match f.to_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "pretty" | "human" => Some(LogFormat::Pretty),
            _ => None,
        })
        .unwrap_or_else(|| config.logging.format.clone());

    // Logs go to stderr; stdout carries the run report
    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| ForgeError::config(format!("Failed to initialize logging: {}", e)))
}

/// Create the span every per-item log line is nested in
///
/// # Example
///
/// ```rust
/// use forge_config::logging::item_span;
/// use std::path::Path;
///
/// let span = item_span("mighty_blade", Path::new("Configurations/mighty_blade.json"));
/// let _enter = span.enter();
/// tracing::info!("Generating item");
/// ```
pub fn item_span(item_id: &str, descriptor: &Path) -> tracing::Span {
    tracing::info_span!(
        "item",
        item = %item_id,
        descriptor = %descriptor.display()
    )
}
