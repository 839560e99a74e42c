//! Twitter credentials and their resolution.

use super::EnvSource;
use crate::errors::{ConfigurationError, MissingCredential};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The credentials required to build a Twitter client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    /// Consumer API key.
    ApiKey,
    /// Consumer API secret.
    ApiSecret,
    /// User access token.
    AccessToken,
    /// User access token secret.
    AccessTokenSecret,
    /// Bearer token used for request authorization.
    BearerToken,
}

impl CredentialKey {
    /// All credential keys, in resolution order.
    pub const ALL: [Self; 5] = [
        Self::ApiKey,
        Self::ApiSecret,
        Self::AccessToken,
        Self::AccessTokenSecret,
        Self::BearerToken,
    ];

    /// The configuration key name.
    #[must_use]
    pub const fn config_key(self) -> &'static str {
        match self {
            Self::ApiKey => "twitter_api_key",
            Self::ApiSecret => "twitter_api_secret",
            Self::AccessToken => "twitter_access_token",
            Self::AccessTokenSecret => "twitter_access_token_secret",
            Self::BearerToken => "twitter_bearer_token",
        }
    }

    /// The environment variable consulted when the key is not configured.
    #[must_use]
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::ApiKey => "TWITTER_API_KEY",
            Self::ApiSecret => "TWITTER_API_SECRET",
            Self::AccessToken => "TWITTER_ACCESS_TOKEN",
            Self::AccessTokenSecret => "TWITTER_ACCESS_TOKEN_SECRET",
            Self::BearerToken => "TWITTER_BEARER_TOKEN",
        }
    }

    /// Looks a key up by its configuration name.
    #[must_use]
    pub fn from_config_key(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.config_key() == name)
    }
}

/// Explicitly supplied credentials. Any subset may be present.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialsConfig {
    /// Consumer API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_api_key: Option<String>,
    /// Consumer API secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_api_secret: Option<String>,
    /// User access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_access_token: Option<String>,
    /// User access token secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_access_token_secret: Option<String>,
    /// Bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_bearer_token: Option<String>,
}

impl CredentialsConfig {
    /// Creates an empty configuration; everything resolves from the environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from named pairs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::Invalid` for an unknown key.
    pub fn from_pairs<K, V, I>(pairs: I) -> Result<Self, ConfigurationError>
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut config = Self::new();
        for (name, value) in pairs {
            let key = CredentialKey::from_config_key(name.as_ref()).ok_or_else(|| {
                ConfigurationError::invalid(format!("unknown credential '{}'", name.as_ref()))
            })?;
            config = config.with(key, value);
        }
        Ok(config)
    }

    /// Sets a credential.
    #[must_use]
    pub fn with(mut self, key: CredentialKey, value: impl Into<String>) -> Self {
        *self.slot_mut(key) = Some(value.into());
        self
    }

    /// Returns the explicitly configured value for a key.
    #[must_use]
    pub fn get(&self, key: CredentialKey) -> Option<&str> {
        match key {
            CredentialKey::ApiKey => self.twitter_api_key.as_deref(),
            CredentialKey::ApiSecret => self.twitter_api_secret.as_deref(),
            CredentialKey::AccessToken => self.twitter_access_token.as_deref(),
            CredentialKey::AccessTokenSecret => self.twitter_access_token_secret.as_deref(),
            CredentialKey::BearerToken => self.twitter_bearer_token.as_deref(),
        }
    }

    fn slot_mut(&mut self, key: CredentialKey) -> &mut Option<String> {
        match key {
            CredentialKey::ApiKey => &mut self.twitter_api_key,
            CredentialKey::ApiSecret => &mut self.twitter_api_secret,
            CredentialKey::AccessToken => &mut self.twitter_access_token,
            CredentialKey::AccessTokenSecret => &mut self.twitter_access_token_secret,
            CredentialKey::BearerToken => &mut self.twitter_bearer_token,
        }
    }

    /// Resolves every credential, falling back to the environment.
    ///
    /// Explicit values win when non-empty; otherwise a non-empty
    /// environment variable is used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingCredentials` naming every key
    /// absent from both sources.
    pub fn resolve(&self, env: &dyn EnvSource) -> Result<Credentials, ConfigurationError> {
        let mut resolved = HashMap::new();
        let mut missing = Vec::new();

        for key in CredentialKey::ALL {
            let explicit = self
                .get(key)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string);
            let value = explicit.or_else(|| env.var(key.env_var()).filter(|v| !v.is_empty()));

            match value {
                Some(value) => {
                    resolved.insert(key, value);
                }
                None => missing.push(MissingCredential::new(key.config_key(), key.env_var())),
            }
        }

        if !missing.is_empty() {
            return Err(ConfigurationError::MissingCredentials(missing));
        }

        let mut take = |key: CredentialKey| resolved.remove(&key).unwrap_or_default();
        Ok(Credentials {
            api_key: take(CredentialKey::ApiKey),
            api_secret: take(CredentialKey::ApiSecret),
            access_token: take(CredentialKey::AccessToken),
            access_token_secret: take(CredentialKey::AccessTokenSecret),
            bearer_token: take(CredentialKey::BearerToken),
        })
    }
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let present: Vec<&str> = CredentialKey::ALL
            .into_iter()
            .filter(|k| self.get(*k).is_some())
            .map(CredentialKey::config_key)
            .collect();
        f.debug_struct("CredentialsConfig")
            .field("present", &present)
            .finish()
    }
}

/// Fully resolved credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Consumer API key.
    pub api_key: String,
    /// Consumer API secret.
    pub api_secret: String,
    /// User access token.
    pub access_token: String,
    /// User access token secret.
    pub access_token_secret: String,
    /// Bearer token.
    pub bearer_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"***")
            .field("api_secret", &"***")
            .field("access_token", &"***")
            .field("access_token_secret", &"***")
            .field("bearer_token", &"***")
            .finish()
    }
}
