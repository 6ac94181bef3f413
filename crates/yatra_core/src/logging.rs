//! Tracing subscriber setup.
//!
//! Library crates only emit `tracing` events. The binary decides where they
//! go by building a [`TracingSetup`] (usually from the `[logging]` table of
//! the configuration file) and calling [`TracingSetup::init`] once.
//!
//! # Example
//!
//! ```
//! use yatra_core::{TracingFormat, TracingSetup};
//! use tracing::Level;
//!
//! TracingSetup::new()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Compact)
//!     .with_env_filter("yatra_agent=debug,reqwest=warn")
//!     .init();
//! ```

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// How events are rendered on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingFormat {
    /// Multi-line, colored; for a terminal.
    #[default]
    Pretty,
    /// One line per event.
    Compact,
    /// One JSON object per event.
    Json,
}

/// The `[logging]` configuration table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum level: `trace`, `debug`, `info`, `warn` or `error`.
    pub level: String,
    /// Output format.
    pub format: TracingFormat,
    /// Target-specific directives, e.g. `"yatra_agent=debug,hyper=warn"`.
    pub filter: Option<String>,
    /// Whether to log span enter/exit.
    pub span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: TracingFormat::Pretty,
            filter: None,
            span_events: false,
        }
    }
}

/// Builder for the process-wide `tracing` subscriber.
#[derive(Debug, Clone)]
pub struct TracingSetup {
    level: Level,
    format: TracingFormat,
    env_filter: Option<String>,
    span_events: bool,
}

impl Default for TracingSetup {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingSetup {
    /// `info`, pretty, no span events.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a setup from a `[logging]` table.
    ///
    /// An unrecognised level falls back to `info`.
    #[must_use]
    pub fn from_config(config: &LoggingConfig) -> Self {
        let level = Level::from_str(&config.level).unwrap_or(Level::INFO);
        let mut setup = Self::new()
            .with_level(level)
            .with_format(config.format)
            .with_span_events(config.span_events);
        if let Some(filter) = &config.filter {
            setup = setup.with_env_filter(filter.clone());
        }
        setup
    }

    /// Level used when no filter is set, or the filter is invalid.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Per-target directives such as `yatra_agent=debug,reqwest=warn`.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Logs span enter and exit.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Installs the subscriber.
    ///
    /// Returns `false` if a global subscriber was already installed, in which
    /// case this call has no effect.
    pub fn init(&self) -> bool {
        let env_filter = match &self.env_filter {
            Some(filter) => {
                EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
            }
            None => EnvFilter::new(self.level.as_str()),
        };

        let span_events = if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        };

        let fmt = tracing_subscriber::fmt::layer().with_span_events(span_events);
        let output: Box<dyn Layer<Registry> + Send + Sync> = match self.format {
            TracingFormat::Pretty => fmt.pretty().boxed(),
            TracingFormat::Compact => fmt.compact().boxed(),
            TracingFormat::Json => fmt.json().boxed(),
        };

        tracing_subscriber::registry()
            .with(output)
            .with(env_filter)
            .try_init()
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_format_default_is_pretty() {
        assert_eq!(TracingFormat::default(), TracingFormat::Pretty);
    }

    #[test]
    fn setup_default_level_is_info() {
        assert_eq!(TracingSetup::default().level, Level::INFO);
    }

    #[test]
    fn setup_builders() {
        let setup = TracingSetup::new()
            .with_level(Level::DEBUG)
            .with_format(TracingFormat::Json)
            .with_env_filter("yatra_agent=debug")
            .with_span_events(true);

        assert_eq!(setup.level, Level::DEBUG);
        assert_eq!(setup.format, TracingFormat::Json);
        assert_eq!(setup.env_filter.as_deref(), Some("yatra_agent=debug"));
        assert!(setup.span_events);
    }

    #[test]
    fn from_config_parses_level_and_format() {
        let config: LoggingConfig = toml::from_str(
            r#"
            level = "warn"
            format = "compact"
            filter = "reqwest=error"
            "#,
        )
        .unwrap();
        let setup = TracingSetup::from_config(&config);

        assert_eq!(setup.level, Level::WARN);
        assert_eq!(setup.format, TracingFormat::Compact);
        assert_eq!(setup.env_filter.as_deref(), Some("reqwest=error"));
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        let config = LoggingConfig {
            level: "chatty".into(),
            ..LoggingConfig::default()
        };
        assert_eq!(TracingSetup::from_config(&config).level, Level::INFO);
    }

    #[test]
    fn second_init_is_a_noop() {
        let setup = TracingSetup::new().with_format(TracingFormat::Compact);
        setup.init();
        assert!(!setup.init());
    }
}
