//! Credential and wrapper fixtures.

use std::sync::Arc;

use super::mocks::{InMemoryTwitterClient, StaticClientFactory};
use crate::config::{CredentialKey, CredentialsConfig, MapEnv};
use crate::wrapper::TwitterApiWrapper;

/// Returns a config with every credential set to a fake value.
#[must_use]
pub fn fake_credentials() -> CredentialsConfig {
    CredentialKey::ALL
        .iter()
        .fold(CredentialsConfig::new(), |config, key| {
            config.with(*key, format!("fake-{}", key.config_key()))
        })
}

/// Returns an environment with every credential variable set to a fake value.
#[must_use]
pub fn fake_env() -> MapEnv {
    CredentialKey::ALL
        .iter()
        .fold(MapEnv::new(), |env, key| {
            env.with(key.env_var(), format!("fake-env-{}", key.config_key()))
        })
}

/// Builds a wrapper over a fresh [`InMemoryTwitterClient`] with the
/// built-in actions registered.
///
/// # Panics
///
/// Panics if the wrapper cannot be built, which only happens if the fake
/// credentials are incomplete.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_wrapper() -> (TwitterApiWrapper, Arc<InMemoryTwitterClient>) {
    let (factory, client) = StaticClientFactory::in_memory();
    let wrapper = TwitterApiWrapper::builder()
        .with_credentials(fake_credentials())
        .with_env(MapEnv::new())
        .with_client_factory(Arc::new(factory))
        .build()
        .expect("fake credentials are complete");
    (wrapper, client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvSource;

    #[test]
    fn test_fake_credentials_cover_every_key() {
        let config = fake_credentials();
        for key in CredentialKey::ALL {
            assert!(config.get(key).unwrap().starts_with("fake-"));
        }
    }

    #[test]
    fn test_fake_env_uses_env_var_names() {
        let env = fake_env();
        assert_eq!(
            env.var("TWITTER_BEARER_TOKEN").as_deref(),
            Some("fake-env-twitter_bearer_token")
        );
    }
}
