//! Tracing and logging support.
//!
//! Installs a `tracing-subscriber` registry filtered by `RUST_LOG` (default
//! `info`). Log lines go to stderr so command output on stdout stays
//! machine-readable.

#[cfg(feature = "tracing")]
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter, Layer,
    Registry,
};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TracingFormat {
    /// Human-readable multi-line output.
    Pretty,

    /// One line per event (default for the CLI).
    Compact,

    /// JSON lines, for log shippers.
    Json,
}

/// Tracing configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Filter directive such as `debug` or `growgold_access=trace`.
    ///
    /// If None, uses RUST_LOG or defaults to "info".
    pub level: Option<String>,

    pub format: TracingFormat,

    pub timestamps: bool,

    /// Include target module names in output.
    pub target: bool,

    pub thread_ids: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: None,
            format: TracingFormat::Compact,
            timestamps: true,
            target: true,
            thread_ids: false,
        }
    }
}

/// Initialize the subscriber with default settings.
#[cfg(feature = "tracing")]
pub fn init_subscriber() -> Result<(), TryInitError> {
    init_subscriber_with_config(TracingConfig::default())
}

/// Initialize the subscriber with a custom configuration.
///
/// Fails if a global subscriber is already installed.
#[cfg(feature = "tracing")]
pub fn init_subscriber_with_config(config: TracingConfig) -> Result<(), TryInitError> {
    let filter = match &config.level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(fmt_layer(&config))
        .with(filter)
        .try_init()
}

#[cfg(feature = "tracing")]
fn fmt_layer(config: &TracingConfig) -> Box<dyn Layer<Registry> + Send + Sync> {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.target)
        .with_thread_ids(config.thread_ids);

    match (config.format, config.timestamps) {
        (TracingFormat::Pretty, true) => layer.pretty().boxed(),
        (TracingFormat::Pretty, false) => layer.pretty().without_time().boxed(),
        (TracingFormat::Compact, true) => layer.compact().boxed(),
        (TracingFormat::Compact, false) => layer.compact().without_time().boxed(),
        (TracingFormat::Json, true) => layer.json().boxed(),
        (TracingFormat::Json, false) => layer.json().without_time().boxed(),
    }
}

// Fallbacks when tracing feature is disabled
#[cfg(not(feature = "tracing"))]
pub fn init_subscriber() -> Result<(), std::convert::Infallible> {
    Ok(())
}

#[cfg(not(feature = "tracing"))]
pub fn init_subscriber_with_config(_config: TracingConfig) -> Result<(), std::convert::Infallible> {
    Ok(())
}
