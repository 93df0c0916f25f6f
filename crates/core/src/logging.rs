//! Logging infrastructure for keyhook.
//!
//! This module initializes the tracing subscriber for structured logging.
//! All logs are emitted to stderr: stdout is reserved for the hook payload
//! the host parses, so a stray log line there would break the hook.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, AppResult};

/// Filter applied when nothing else is configured. Hooks stay quiet unless asked.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Initialize the tracing subscriber with stderr output.
///
/// The filter is taken from `log_level`, then `KEYHOOK_LOG`, then `RUST_LOG`,
/// and finally [`DEFAULT_LOG_LEVEL`].
///
/// # Example
/// ```no_run
/// use keyhook_core::logging::init_logging;
///
/// init_logging(None, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(log_level: Option<&str>, no_color: bool) -> AppResult<()> {
    let filter_str = filter_directive(log_level, |key| std::env::var(key).ok());

    let env_filter = EnvFilter::try_new(&filter_str)
        .map_err(|e| AppError::Config(format!("Invalid log filter: {}", e)))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(!no_color && supports_color());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AppError::Config(format!("Failed to init logging: {}", e)))?;

    Ok(())
}

/// Pick the filter directive, reading environment values via `lookup`.
fn filter_directive<F>(log_level: Option<&str>, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    log_level
        .map(str::to_string)
        .or_else(|| lookup("KEYHOOK_LOG"))
        .or_else(|| lookup("RUST_LOG"))
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

/// Check if the terminal supports color output.
fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}
