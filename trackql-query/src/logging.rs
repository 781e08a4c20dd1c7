//! Logging for query construction.
//!
//! The crate emits `tracing` events while joining terms, negating fragments
//! and executing statements. Nothing is printed unless a subscriber is
//! installed, either by the application or by [`init`] when the
//! `tracing-subscriber` feature is enabled.
//!
//! # Environment Variables
//!
//! - `TRACKQL_DEBUG=true|1|yes` - Enable debug logging
//! - `TRACKQL_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific level
//! - `TRACKQL_LOG_FORMAT=json|pretty|compact` - Output format (default: json)
//!
//! ```rust,no_run
//! use trackql_query::logging;
//!
//! logging::init();
//! ```

use std::env;
use std::sync::Once;

use crate::config::QueryConfig;

#[doc(hidden)]
pub use tracing as __tracing;

static INIT: Once = Once::new();

const DEBUG_VAR: &str = "TRACKQL_DEBUG";
const LEVEL_VAR: &str = "TRACKQL_LOG_LEVEL";
const FORMAT_VAR: &str = "TRACKQL_LOG_FORMAT";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line human readable output.
    Pretty,
    /// Single-line human readable output.
    Compact,
}

impl LogFormat {
    /// Parse a format name, falling back to JSON.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "pretty" => Self::Pretty,
            "compact" => Self::Compact,
            _ => Self::Json,
        }
    }
}

/// Interpret a boolean-ish flag value.
pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

/// Pick a level from an explicit request, falling back on the debug flag.
fn resolve_level(requested: Option<&str>, debug: bool) -> &'static str {
    let fallback = if debug { "debug" } else { "warn" };
    match requested.map(str::to_lowercase).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("info") => "info",
        Some("warn") => "warn",
        Some("error") => "error",
        _ => fallback,
    }
}

/// Check whether `TRACKQL_DEBUG` enables debug logging.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var(DEBUG_VAR).map(|v| parse_flag(&v)).unwrap_or(false)
}

/// The level requested through the environment.
///
/// Defaults to `debug` when `TRACKQL_DEBUG` is set, otherwise `warn`.
pub fn log_level() -> &'static str {
    resolve_level(env::var(LEVEL_VAR).ok().as_deref(), is_debug_enabled())
}

/// The format requested through `TRACKQL_LOG_FORMAT`.
pub fn log_format() -> LogFormat {
    env::var(FORMAT_VAR)
        .map(|f| LogFormat::from_name(&f))
        .unwrap_or_default()
}

/// Initialise logging from the environment.
///
/// Subsequent calls are no-ops. Nothing is installed unless `TRACKQL_DEBUG`
/// or `TRACKQL_LOG_LEVEL` is set.
pub fn init() {
    if !is_debug_enabled() && env::var(LEVEL_VAR).is_err() {
        return;
    }
    install(log_level(), log_format());
}

/// Initialise logging from a loaded configuration.
///
/// `debug = true` in the configuration behaves like `TRACKQL_DEBUG`; an
/// explicit `TRACKQL_LOG_LEVEL` still wins.
pub fn init_with_config(config: &QueryConfig) {
    let debug = config.debug || is_debug_enabled();
    if !debug && env::var(LEVEL_VAR).is_err() {
        return;
    }
    install(
        resolve_level(env::var(LEVEL_VAR).ok().as_deref(), debug),
        log_format(),
    );
}

/// Initialise logging at a fixed level, ignoring the environment.
pub fn init_with_level(level: &str) {
    install(resolve_level(Some(level), false), log_format());
}

fn install(level: &'static str, format: LogFormat) {
    INIT.call_once(|| {
        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let filter = EnvFilter::try_new(format!("trackql={level},trackql_query={level}"))
                .unwrap_or_else(|_| EnvFilter::new("warn"));
            let registry = tracing_subscriber::registry().with(filter);

            // A subscriber installed by the application takes precedence.
            let installed = match format {
                LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
                LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
                LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
            };
            if installed.is_err() {
                return;
            }

            tracing::info!(level, format = ?format, "trackql logging initialized");
        }

        #[cfg(not(feature = "tracing-subscriber"))]
        {
            let _ = (level, format);
        }
    });
}

/// Debug event emitted only when `TRACKQL_DEBUG` is enabled at runtime.
#[macro_export]
macro_rules! trackql_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            $crate::logging::__tracing::debug!($($arg)*);
        }
    };
}
