//! Named action arguments.

use crate::errors::ActionError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Named JSON arguments passed to an action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionArgs(HashMap<String, serde_json::Value>);

impl ActionArgs {
    /// Creates empty arguments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds arguments from a JSON object.
    ///
    /// `null` is treated as no arguments.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::InvalidArguments` for anything but an object or null.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ActionError> {
        match value {
            serde_json::Value::Object(map) => Ok(Self(map.into_iter().collect())),
            serde_json::Value::Null => Ok(Self::new()),
            other => Err(ActionError::invalid_arguments(format!(
                "expected an object, got {other}"
            ))),
        }
    }

    /// Adds an argument.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Returns an argument.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }

    /// Returns a required string argument.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::InvalidArguments` if it is missing or not a string.
    pub fn required_str(&self, name: &str) -> Result<&str, ActionError> {
        self.optional_str(name)?
            .ok_or_else(|| ActionError::invalid_arguments(format!("missing required argument '{name}'")))
    }

    /// Returns an optional string argument.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::InvalidArguments` if it is present but not a string.
    pub fn optional_str(&self, name: &str) -> Result<Option<&str>, ActionError> {
        match self.0.get(name) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(ActionError::invalid_arguments(format!(
                "argument '{name}' must be a string"
            ))),
        }
    }

    /// Returns an optional unsigned integer argument.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::InvalidArguments` if it is present but not a
    /// non-negative integer.
    pub fn optional_u64(&self, name: &str) -> Result<Option<u64>, ActionError> {
        match self.0.get(name) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => value.as_u64().map(Some).ok_or_else(|| {
                ActionError::invalid_arguments(format!(
                    "argument '{name}' must be a non-negative integer"
                ))
            }),
        }
    }

    /// Deserializes all arguments into `T`.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::InvalidArguments` if they do not match `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ActionError> {
        let value = serde_json::Value::Object(self.0.clone().into_iter().collect());
        serde_json::from_value(value).map_err(|e| ActionError::invalid_arguments(e.to_string()))
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns argument names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.keys().cloned().collect();
        names.sort();
        names
    }
}

impl From<HashMap<String, serde_json::Value>> for ActionArgs {
    fn from(map: HashMap<String, serde_json::Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<serde_json::Value>> FromIterator<(K, V)> for ActionArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_str() {
        let args = ActionArgs::new().with("tweet", "hello");
        assert_eq!(args.required_str("tweet").unwrap(), "hello");

        let err = args.required_str("missing").unwrap_err();
        assert!(err.to_string().contains("missing required argument 'missing'"));
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let args = ActionArgs::new().with("tweet", 5);
        assert!(matches!(
            args.required_str("tweet"),
            Err(ActionError::InvalidArguments(_))
        ));
        assert!(args.optional_u64("tweet").unwrap() == Some(5));
        assert!(ActionArgs::new().with("n", -1).optional_u64("n").is_err());
    }

    #[test]
    fn test_from_value() {
        let args = ActionArgs::from_value(json!({"a": 1, "b": "two"})).unwrap();
        assert_eq!(args.names(), vec!["a".to_string(), "b".to_string()]);

        assert!(ActionArgs::from_value(json!(null)).unwrap().is_empty());
        assert!(ActionArgs::from_value(json!([1, 2])).is_err());
    }

    #[test]
    fn test_deserialize() {
        #[derive(Deserialize)]
        struct Reply {
            tweet_id: String,
            tweet_reply: String,
        }

        let args: ActionArgs = [("tweet_id", "1"), ("tweet_reply", "hi")].into_iter().collect();
        let reply: Reply = args.deserialize().unwrap();
        assert_eq!(reply.tweet_id, "1");
        assert_eq!(reply.tweet_reply, "hi");
    }
}
