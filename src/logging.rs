//! Logging initialization.
//!
//! Structured logging via `tracing`, rendered either for a terminal or as
//! newline-delimited JSON. `RUST_LOG` selects verbosity; without it the
//! controller logs at `info`, which shows phase changes but not countdowns.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Log output format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// Newline-delimited JSON for log shippers.
    Json,
}

/// Build the filter from `RUST_LOG`, falling back to [`DEFAULT_DIRECTIVE`].
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Initializes the global tracing subscriber.
///
/// Uses `try_init()` so calling this more than once (e.g. in tests) is safe.
pub fn init_logging(format: LogFormat) {
    match format {
        LogFormat::Pretty => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .try_init();
        }
        LogFormat::Json => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .json()
                .with_current_span(false)
                .try_init();
        }
    }
}

/// Run `f` with a scoped subscriber, for the messages emitted while the
/// configuration that selects the final format is still being loaded.
pub fn with_startup_logging<T>(format: LogFormat, f: impl FnOnce() -> T) -> T {
    match format {
        LogFormat::Pretty => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_target(false)
                .finish();
            tracing::subscriber::with_default(subscriber, f)
        }
        LogFormat::Json => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .json()
                .with_current_span(false)
                .finish();
            tracing::subscriber::with_default(subscriber, f)
        }
    }
}
