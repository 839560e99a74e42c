//! Immutable snapshots of the call-local context.

use crate::client::ClientHandle;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use uuid::Uuid;

/// A reference to shared state created by an action, such as a background
/// monitor or its output queue.
///
/// Snapshots hold handles weakly: whoever created the referent owns it.
#[derive(Clone)]
pub struct StoredHandle {
    pub(crate) handle: Weak<dyn Any + Send + Sync>,
    pub(crate) type_name: &'static str,
}

impl StoredHandle {
    pub(crate) fn downgrade(handle: &Arc<dyn Any + Send + Sync>, type_name: &'static str) -> Self {
        Self {
            handle: Arc::downgrade(handle),
            type_name,
        }
    }

    /// Returns the referenced type's name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns whether the referent still exists.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.handle.strong_count() > 0
    }
}

impl std::fmt::Debug for StoredHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredHandle")
            .field("type_name", &self.type_name)
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// A captured context variable.
#[derive(Debug, Clone)]
pub enum ContextValue {
    /// Plain JSON data.
    Data(serde_json::Value),
    /// A weak reference to shared state.
    Handle(StoredHandle),
}

/// An immutable snapshot of the call-local context.
///
/// A wrapper holds exactly one current snapshot and replaces it wholesale
/// after every action. Cloning is cheap apart from the JSON data.
#[derive(Clone)]
pub struct ContextSnapshot {
    snapshot_id: Uuid,
    parent_id: Option<Uuid>,
    generation: u64,
    captured_at: DateTime<Utc>,
    client: ClientHandle,
    values: HashMap<String, ContextValue>,
}

impl ContextSnapshot {
    /// The snapshot taken at wrapper construction: just the client.
    #[must_use]
    pub fn initial(client: ClientHandle) -> Self {
        Self {
            snapshot_id: Uuid::new_v4(),
            parent_id: None,
            generation: 0,
            captured_at: Utc::now(),
            client,
            values: HashMap::new(),
        }
    }

    /// The snapshot that replaces `previous`.
    pub(crate) fn successor(previous: &Self, values: HashMap<String, ContextValue>) -> Self {
        Self {
            snapshot_id: Uuid::new_v4(),
            parent_id: Some(previous.snapshot_id),
            generation: previous.generation + 1,
            captured_at: Utc::now(),
            client: Arc::clone(&previous.client),
            values,
        }
    }

    /// Returns a successor with one variable removed, or `None` if the
    /// variable is not recorded.
    #[must_use]
    pub fn without(&self, name: &str) -> Option<Self> {
        if !self.values.contains_key(name) {
            return None;
        }
        let mut values = self.values.clone();
        values.remove(name);
        Some(Self::successor(self, values))
    }

    /// Returns the snapshot ID.
    #[must_use]
    pub const fn snapshot_id(&self) -> Uuid {
        self.snapshot_id
    }

    /// Returns the ID of the snapshot this one replaced.
    #[must_use]
    pub const fn parent_id(&self) -> Option<Uuid> {
        self.parent_id
    }

    /// Returns how many captures preceded this snapshot.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns when the snapshot was captured.
    #[must_use]
    pub const fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Returns the client handle recorded in the snapshot.
    #[must_use]
    pub const fn client(&self) -> &ClientHandle {
        &self.client
    }

    pub(crate) const fn values(&self) -> &HashMap<String, ContextValue> {
        &self.values
    }

    /// Returns a recorded variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ContextValue> {
        self.values.get(name)
    }

    /// Returns a recorded data variable.
    #[must_use]
    pub fn get_value(&self, name: &str) -> Option<&serde_json::Value> {
        match self.values.get(name) {
            Some(ContextValue::Data(value)) => Some(value),
            _ => None,
        }
    }

    /// Checks if a variable is recorded.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns recorded variable names, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Returns the number of recorded variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no variables are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Converts to a dictionary representation.
    ///
    /// Handles appear as their type name and liveness; the client is omitted.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();

        map.insert("snapshot_id".to_string(), json!(self.snapshot_id.to_string()));
        map.insert(
            "parent_id".to_string(),
            json!(self.parent_id.map(|id| id.to_string())),
        );
        map.insert("generation".to_string(), json!(self.generation));
        map.insert("captured_at".to_string(), json!(self.captured_at.to_rfc3339()));

        let variables: serde_json::Map<String, serde_json::Value> = self
            .values
            .iter()
            .map(|(name, value)| {
                let rendered = match value {
                    ContextValue::Data(data) => data.clone(),
                    ContextValue::Handle(handle) => json!({
                        "handle": handle.type_name,
                        "alive": handle.is_alive(),
                    }),
                };
                (name.clone(), rendered)
            })
            .collect();
        map.insert("variables".to_string(), serde_json::Value::Object(variables));

        map
    }
}

impl std::fmt::Debug for ContextSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextSnapshot")
            .field("snapshot_id", &self.snapshot_id)
            .field("parent_id", &self.parent_id)
            .field("generation", &self.generation)
            .field("captured_at", &self.captured_at)
            .field("keys", &self.keys())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryTwitterClient;

    fn client() -> ClientHandle {
        Arc::new(InMemoryTwitterClient::new())
    }

    #[test]
    fn test_initial_snapshot() {
        let snapshot = ContextSnapshot::initial(client());
        assert_eq!(snapshot.generation(), 0);
        assert!(snapshot.parent_id().is_none());
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_successor_links_to_parent() {
        let first = ContextSnapshot::initial(client());
        let mut values = HashMap::new();
        values.insert("k".to_string(), ContextValue::Data(json!(1)));

        let second = ContextSnapshot::successor(&first, values);
        assert_eq!(second.parent_id(), Some(first.snapshot_id()));
        assert_eq!(second.generation(), 1);
        assert_eq!(second.get_value("k"), Some(&json!(1)));
        assert!(Arc::ptr_eq(first.client(), second.client()));
    }

    #[test]
    fn test_without() {
        let first = ContextSnapshot::initial(client());
        assert!(first.without("missing").is_none());

        let mut values = HashMap::new();
        values.insert("a".to_string(), ContextValue::Data(json!("x")));
        values.insert("b".to_string(), ContextValue::Data(json!("y")));
        let second = ContextSnapshot::successor(&first, values);

        let third = second.without("a").unwrap();
        assert_eq!(third.keys(), vec!["b".to_string()]);
        assert_eq!(third.parent_id(), Some(second.snapshot_id()));
    }

    #[test]
    fn test_to_dict_renders_handles() {
        let first = ContextSnapshot::initial(client());
        let shared: Arc<dyn Any + Send + Sync> = Arc::new(5_u32);
        let mut values = HashMap::new();
        values.insert(
            "h".to_string(),
            ContextValue::Handle(StoredHandle::downgrade(&shared, "u32")),
        );
        let snapshot = ContextSnapshot::successor(&first, values);

        let dict = snapshot.to_dict();
        assert_eq!(dict["variables"]["h"]["handle"], "u32");
        assert_eq!(dict["variables"]["h"]["alive"], true);

        drop(shared);
        assert_eq!(snapshot.to_dict()["variables"]["h"]["alive"], false);
    }
}
