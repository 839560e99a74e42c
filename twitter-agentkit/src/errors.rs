//! Error types for the Twitter action wrapper.
//!
//! Construction failures surface as [`ConfigurationError`], failures to
//! rebuild the call-local scope as [`ContextRestoreError`], and whatever an
//! action returns travels back unchanged as [`ActionError`].

use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

/// The main error type for twitter-agentkit operations.
#[derive(Debug, Error)]
pub enum AgentkitError {
    /// The wrapper could not be configured.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// An action execution failed.
    #[error("{0}")]
    Execute(#[from] ExecuteError),

    /// The Twitter client failed outside of an action.
    #[error("{0}")]
    Client(#[from] ClientError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A credential that was found neither in the explicit configuration nor in
/// the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingCredential {
    /// The configuration key (e.g. `twitter_api_key`).
    pub key: String,
    /// The environment variable consulted as a fallback.
    pub env_var: String,
}

impl MissingCredential {
    /// Creates a new missing credential entry.
    #[must_use]
    pub fn new(key: impl Into<String>, env_var: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            env_var: env_var.into(),
        }
    }
}

impl std::fmt::Display for MissingCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Did not find {key}, please add an environment variable `{env}` which contains it, or pass `{key}` as a named parameter.",
            key = self.key,
            env = self.env_var,
        )
    }
}

fn join_missing(missing: &[MissingCredential]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Error raised while constructing the wrapper.
#[derive(Debug, Clone, Error)]
pub enum ConfigurationError {
    /// One or more required credentials are missing.
    #[error("Missing credentials: {}", join_missing(.0))]
    MissingCredentials(Vec<MissingCredential>),

    /// The configuration is present but unusable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigurationError {
    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// Returns the configuration keys that were missing, if any.
    #[must_use]
    pub fn missing_keys(&self) -> Vec<&str> {
        match self {
            Self::MissingCredentials(missing) => missing.iter().map(|m| m.key.as_str()).collect(),
            Self::Invalid(_) => Vec::new(),
        }
    }
}

/// Error raised when a snapshot cannot be restored into an action context.
#[derive(Debug, Clone, Error)]
#[error("Failed to restore context variable '{variable}': {reason}")]
pub struct ContextRestoreError {
    /// The variable that could not be restored.
    pub variable: String,
    /// Why restoration failed.
    pub reason: String,
}

impl ContextRestoreError {
    /// Creates a new context restore error.
    #[must_use]
    pub fn new(variable: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            reason: reason.into(),
        }
    }
}

/// Errors produced by the Twitter client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The API answered with a non-success status.
    #[error("Twitter API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The response could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The request was rejected before it was sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Errors returned by action implementations.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The supplied arguments were missing or malformed.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// A context variable held a value of an unexpected shape.
    #[error("Invalid context value '{variable}': {reason}")]
    ContextValue {
        /// The variable name.
        variable: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The Twitter client failed.
    #[error("{0}")]
    Client(#[from] ClientError),

    /// The action failed for its own reasons.
    #[error("{0}")]
    Failed(String),

    /// Any other error raised by the action.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ActionError {
    /// Creates an invalid arguments error.
    #[must_use]
    pub fn invalid_arguments(reason: impl Into<String>) -> Self {
        Self::InvalidArguments(reason.into())
    }

    /// Creates a context value error.
    #[must_use]
    pub fn context_value(variable: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ContextValue {
            variable: variable.into(),
            reason: reason.into(),
        }
    }

    /// Creates a generic failure.
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }
}

/// Errors returned by [`crate::wrapper::TwitterApiWrapper::execute`] and friends.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// The current snapshot could not be restored; the action did not run.
    #[error(transparent)]
    Restore(#[from] ContextRestoreError),

    /// The action ran and returned an error.
    #[error(transparent)]
    Action(#[from] ActionError),

    /// No action is registered under the requested name.
    #[error("Action not found: {name}")]
    NotFound {
        /// The requested action name.
        name: String,
    },

    /// A raw tool call could not be resolved to an action.
    #[error("Unresolved action call: {0}")]
    UnresolvedCall(String),
}

impl ExecuteError {
    /// Creates an action not found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Returns the action's own error, if that is what this is.
    #[must_use]
    pub fn into_action_error(self) -> Option<ActionError> {
        match self {
            Self::Action(err) => Some(err),
            _ => None,
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();

        match self {
            Self::Restore(err) => {
                map.insert("type".to_string(), json!("ContextRestoreError"));
                map.insert("variable".to_string(), json!(err.variable));
                map.insert("reason".to_string(), json!(err.reason));
            }
            Self::Action(_) => {
                map.insert("type".to_string(), json!("ActionError"));
            }
            Self::NotFound { name } => {
                map.insert("type".to_string(), json!("ActionNotFound"));
                map.insert("name".to_string(), json!(name));
            }
            Self::UnresolvedCall(_) => {
                map.insert("type".to_string(), json!("UnresolvedActionCall"));
            }
        }

        map.insert("message".to_string(), json!(self.to_string()));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_message() {
        let missing = MissingCredential::new("twitter_api_key", "TWITTER_API_KEY");
        assert_eq!(
            missing.to_string(),
            "Did not find twitter_api_key, please add an environment variable `TWITTER_API_KEY` which contains it, or pass `twitter_api_key` as a named parameter."
        );
    }

    #[test]
    fn test_configuration_error_lists_all_missing() {
        let err = ConfigurationError::MissingCredentials(vec![
            MissingCredential::new("twitter_api_key", "TWITTER_API_KEY"),
            MissingCredential::new("twitter_bearer_token", "TWITTER_BEARER_TOKEN"),
        ]);

        let message = err.to_string();
        assert!(message.contains("TWITTER_API_KEY"));
        assert!(message.contains("TWITTER_BEARER_TOKEN"));
        assert_eq!(err.missing_keys(), vec!["twitter_api_key", "twitter_bearer_token"]);
    }

    #[test]
    fn test_action_error_is_transparent_inside_execute_error() {
        let err = ExecuteError::from(ActionError::failed("boom"));
        assert_eq!(err.to_string(), "boom");

        let inner = err.into_action_error().unwrap();
        assert!(matches!(inner, ActionError::Failed(ref m) if m == "boom"));
    }

    #[test]
    fn test_anyhow_error_passes_through() {
        let err: ActionError = anyhow::anyhow!("upstream exploded").into();
        assert_eq!(err.to_string(), "upstream exploded");
    }

    #[test]
    fn test_execute_error_to_dict() {
        let err = ExecuteError::from(ContextRestoreError::new("monitor-thread", "dropped"));
        let dict = err.to_dict();

        assert_eq!(dict.get("type").unwrap(), "ContextRestoreError");
        assert_eq!(dict.get("variable").unwrap(), "monitor-thread");

        let dict = ExecuteError::not_found("nope").to_dict();
        assert_eq!(dict.get("type").unwrap(), "ActionNotFound");
    }

    #[test]
    fn test_unresolved_call_to_dict() {
        let err = ExecuteError::UnresolvedCall("No action registered with name 'nope'".to_string());
        let dict = err.to_dict();

        assert_eq!(dict.get("type").unwrap(), "UnresolvedActionCall");
        assert_eq!(
            dict.get("message").unwrap(),
            "Unresolved action call: No action registered with name 'nope'"
        );
    }
}
