//! Logging setup.

mod logging;

pub use logging::{build_env_filter, init_logging, LogFormat, LogOutput, LoggingConfig, LOG_ENV_VAR};
