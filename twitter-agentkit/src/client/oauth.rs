//! OAuth 1.0a request signing (HMAC-SHA1) for user-context endpoints.

use crate::config::Credentials;
use crate::errors::ClientError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters stay literal; everything else is encoded.
fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Signs requests on behalf of the user that owns the access token.
#[derive(Clone)]
pub(crate) struct OAuth1Signer {
    consumer_key: String,
    consumer_secret: String,
    token: String,
    token_secret: String,
}

impl OAuth1Signer {
    pub(crate) fn from_credentials(credentials: &Credentials) -> Self {
        Self {
            consumer_key: credentials.api_key.clone(),
            consumer_secret: credentials.api_secret.clone(),
            token: credentials.access_token.clone(),
            token_secret: credentials.access_token_secret.clone(),
        }
    }

    /// Builds an `Authorization` header with a fresh nonce and timestamp.
    ///
    /// `url` must not carry a query string; query parameters go in `params`.
    pub(crate) fn authorization(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<String, ClientError> {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let timestamp = chrono::Utc::now().timestamp();
        self.authorization_with(method, url, params, &nonce, timestamp)
    }

    pub(crate) fn authorization_with(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
        nonce: &str,
        timestamp: i64,
    ) -> Result<String, ClientError> {
        let timestamp = timestamp.to_string();
        let oauth_params = [
            ("oauth_consumer_key", self.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", self.token.as_str()),
            ("oauth_version", "1.0"),
        ];

        let mut encoded: Vec<(String, String)> = oauth_params
            .iter()
            .map(|(k, v)| (encode(k), encode(v)))
            .chain(params.iter().map(|(k, v)| (encode(k), encode(v))))
            .collect();
        encoded.sort();
        let parameter_string = encoded
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let base_string = format!(
            "{}&{}&{}",
            method.to_ascii_uppercase(),
            encode(url),
            encode(&parameter_string)
        );
        let signature = self.sign(&base_string)?;

        let mut header: Vec<(&str, &str)> = oauth_params.to_vec();
        header.push(("oauth_signature", signature.as_str()));
        header.sort_unstable();
        let fields = header
            .iter()
            .map(|(k, v)| format!("{k}=\"{}\"", encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {fields}"))
    }

    fn sign(&self, base_string: &str) -> Result<String, ClientError> {
        let key = format!(
            "{}&{}",
            encode(&self.consumer_secret),
            encode(&self.token_secret)
        );
        let mut mac = HmacSha1::new_from_slice(key.as_bytes())
            .map_err(|e| ClientError::InvalidRequest(format!("invalid signing key: {e}")))?;
        mac.update(base_string.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

impl std::fmt::Debug for OAuth1Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth1Signer").finish_non_exhaustive()
    }
}
