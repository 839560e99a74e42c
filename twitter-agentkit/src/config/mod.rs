//! Credential resolution and wrapper settings.
//!
//! This module provides:
//! - Named credential keys with environment-variable fallbacks
//! - Environment sources (process or in-memory)
//! - Serde-loadable settings with defaults

mod credentials;
mod env;
mod settings;

pub use credentials::{CredentialKey, Credentials, CredentialsConfig};
pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use settings::Settings;
