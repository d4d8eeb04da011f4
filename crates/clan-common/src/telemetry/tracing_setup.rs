//! Tracing subscriber setup
//!
//! Production defaults to JSON lines without source locations; everything
//! else gets pretty output. `LOG_FORMAT` and `LOG_LEVEL` override the
//! defaults, and `RUST_LOG` beats both when set.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Environment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl LogFormat {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "compact" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub level: Level,
    pub format: LogFormat,
    pub file_line: bool,
}

impl TracingConfig {
    #[must_use]
    pub fn for_environment(env: Environment) -> Self {
        if env.is_production() {
            Self {
                level: Level::INFO,
                format: LogFormat::Json,
                file_line: false,
            }
        } else {
            Self {
                level: Level::DEBUG,
                format: LogFormat::Pretty,
                file_line: true,
            }
        }
    }

    /// Reads `.env` if present, then `APP_ENV`, `LOG_FORMAT` and `LOG_LEVEL`.
    /// Unparseable values fall back to the environment's defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let var = |key: &str| std::env::var(key).ok();

        let env = var("APP_ENV")
            .and_then(|s| Environment::parse(&s))
            .unwrap_or_default();
        Self::for_environment(env).with_overrides(
            var("LOG_FORMAT").as_deref(),
            var("LOG_LEVEL").as_deref(),
        )
    }

    fn with_overrides(mut self, format: Option<&str>, level: Option<&str>) -> Self {
        if let Some(format) = format.and_then(LogFormat::parse) {
            self.format = format;
            self.file_line = format != LogFormat::Json;
        }
        if let Some(level) = level.and_then(|s| s.trim().parse::<Level>().ok()) {
            self.level = level;
        }
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,
}

/// Install the global subscriber configured from the environment
pub fn try_init_tracing() -> Result<(), TracingError> {
    try_init_tracing_with_config(&TracingConfig::from_env())
}

pub fn try_init_tracing_with_config(config: &TracingConfig) -> Result<(), TracingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str().to_ascii_lowercase()));
    let layer = fmt::layer()
        .with_file(config.file_line)
        .with_line_number(config.file_line);
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => registry.with(layer.json()).try_init(),
        LogFormat::Compact => registry.with(layer.compact()).try_init(),
        LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
    }
    .map_err(|_| TracingError::AlreadyInitialized)
}
