//! Client construction from resolved credentials.

use super::ClientHandle;
use crate::config::{Credentials, Settings};
use crate::errors::ConfigurationError;

/// Builds a client handle from credentials.
pub trait ClientFactory: Send + Sync {
    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` when the client cannot be built from the
    /// given credentials or settings.
    fn build(
        &self,
        credentials: &Credentials,
        settings: &Settings,
    ) -> Result<ClientHandle, ConfigurationError>;
}

/// Builds [`super::HttpTwitterClient`]s.
#[cfg(feature = "http")]
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpClientFactory;

#[cfg(feature = "http")]
impl ClientFactory for HttpClientFactory {
    fn build(
        &self,
        credentials: &Credentials,
        settings: &Settings,
    ) -> Result<ClientHandle, ConfigurationError> {
        let client = super::HttpTwitterClient::new(credentials, settings)?;
        Ok(std::sync::Arc::new(client))
    }
}
