//! Structured logging through `tracing-subscriber`.
//!
//! Library code only emits `tracing` events; applications call
//! [`init_logging`] once to install a subscriber.

use crate::config::{EnvSource, ProcessEnv};
use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding a filter directive that overrides the config.
pub const LOG_ENV_VAR: &str = "TWITTER_AGENTKIT_LOG";

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Output destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Standard error.
    #[default]
    Stderr,
    /// Standard output.
    Stdout,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether to install a subscriber at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Default level: trace, debug, info, warn, error or off.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Output destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Colored output, text format only.
    #[serde(default)]
    pub color: bool,

    /// Per-module levels, e.g. `twitter_agentkit::wrapper = "debug"`.
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            color: false,
            modules: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Sets the default level.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Sets the output format.
    #[must_use]
    pub const fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a level for one module.
    #[must_use]
    pub fn with_module(mut self, module: impl Into<String>, level: impl Into<String>) -> Self {
        self.modules.insert(module.into(), level.into());
        self
    }

    fn directives(&self) -> String {
        std::iter::once(self.level.clone())
            .chain(
                self.modules
                    .iter()
                    .map(|(module, level)| format!("{module}={level}")),
            )
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Builds the filter for `config`.
///
/// A non-empty [`LOG_ENV_VAR`] replaces the configured directives.
///
/// # Errors
///
/// Returns `ConfigurationError::Invalid` if the directives do not parse.
pub fn build_env_filter(
    config: &LoggingConfig,
    env: &dyn EnvSource,
) -> Result<EnvFilter, ConfigurationError> {
    let directives = env
        .var(LOG_ENV_VAR)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.directives());

    EnvFilter::try_new(&directives).map_err(|e| {
        ConfigurationError::invalid(format!("invalid log filter '{directives}': {e}"))
    })
}

/// Installs the global `tracing` subscriber.
///
/// Does nothing when `config.enabled` is false.
///
/// # Errors
///
/// Returns `ConfigurationError::Invalid` if the filter does not parse or a
/// global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigurationError> {
    if !config.enabled {
        return Ok(());
    }

    let filter = build_env_filter(config, &ProcessEnv)?;
    let result = match config.output {
        LogOutput::Stderr => install(filter, config, std::io::stderr),
        LogOutput::Stdout => install(filter, config, std::io::stdout),
    };

    result.map_err(|e| ConfigurationError::invalid(format!("failed to install logger: {e}")))
}

fn install<W>(filter: EnvFilter, config: &LoggingConfig, writer: W) -> Result<(), TryInitError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_writer(writer))
            .try_init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(config.color)
                    .with_writer(writer),
            )
            .try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapEnv;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config: LoggingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LoggingConfig::default());
        assert!(config.enabled);
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Text);
    }

    #[test]
    fn test_format_parses_lowercase() {
        let config: LoggingConfig =
            serde_json::from_str(r#"{"format": "json", "output": "stdout"}"#).unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.output, LogOutput::Stdout);
    }

    #[test]
    fn test_directives_include_modules() {
        let config = LoggingConfig::default()
            .with_level("warn")
            .with_module("twitter_agentkit::wrapper", "debug");
        assert_eq!(config.directives(), "warn,twitter_agentkit::wrapper=debug");
        assert!(build_env_filter(&config, &MapEnv::new()).is_ok());
    }

    #[test]
    fn test_env_var_overrides_config() {
        let env = MapEnv::new().with(LOG_ENV_VAR, "twitter_agentkit=loud");
        assert!(build_env_filter(&LoggingConfig::default(), &env).is_err());

        let env = MapEnv::new().with(LOG_ENV_VAR, "  ");
        assert!(build_env_filter(&LoggingConfig::default(), &env).is_ok());
    }

    #[test]
    fn test_disabled_logging_is_a_noop() {
        let config = LoggingConfig {
            enabled: false,
            ..LoggingConfig::default()
        };
        assert!(init_logging(&config).is_ok());
    }
}
