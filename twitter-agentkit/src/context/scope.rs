//! The request-scoped context an action runs against.

use super::snapshot::StoredHandle;
use super::{ContextSnapshot, ContextValue, ContextVar};
use crate::client::ClientHandle;
use crate::errors::{ActionError, ContextRestoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// A restored variable. Handles are strong for the duration of the call.
#[derive(Clone)]
enum LiveValue {
    Data(serde_json::Value),
    Handle {
        handle: Arc<dyn Any + Send + Sync>,
        type_name: &'static str,
    },
}

/// The call-local scope an action reads and mutates.
///
/// Built from the wrapper's current snapshot with [`ActionContext::restore`]
/// and turned back into a snapshot with [`ActionContext::capture`]. It is
/// passed to the action by `&mut` and never stored anywhere global.
pub struct ActionContext {
    client: ClientHandle,
    snapshot_id: Uuid,
    generation: u64,
    values: HashMap<String, LiveValue>,
}

impl ActionContext {
    /// Restores every variable recorded in `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns `ContextRestoreError` if the snapshot was captured with a
    /// different client, or if a recorded handle's referent has been dropped.
    pub fn restore(
        snapshot: &ContextSnapshot,
        client: &ClientHandle,
    ) -> Result<Self, ContextRestoreError> {
        if !Arc::ptr_eq(snapshot.client(), client) {
            return Err(ContextRestoreError::new(
                "client",
                "snapshot was captured with a different client handle",
            ));
        }

        let mut names: Vec<&String> = snapshot.values().keys().collect();
        names.sort();

        let mut values = HashMap::with_capacity(names.len());
        for name in names {
            let live = match &snapshot.values()[name] {
                ContextValue::Data(value) => LiveValue::Data(value.clone()),
                ContextValue::Handle(stored) => {
                    let handle = stored.handle.upgrade().ok_or_else(|| {
                        ContextRestoreError::new(
                            name.as_str(),
                            format!("handle of type {} no longer exists", stored.type_name),
                        )
                    })?;
                    LiveValue::Handle {
                        handle,
                        type_name: stored.type_name,
                    }
                }
            };
            values.insert(name.clone(), live);
        }

        Ok(Self {
            client: Arc::clone(client),
            snapshot_id: snapshot.snapshot_id(),
            generation: snapshot.generation(),
            values,
        })
    }

    /// Captures the scope as the successor of `previous`.
    #[must_use]
    pub fn capture(self, previous: &ContextSnapshot) -> ContextSnapshot {
        let values = self
            .values
            .into_iter()
            .map(|(name, live)| {
                let value = match live {
                    LiveValue::Data(value) => ContextValue::Data(value),
                    LiveValue::Handle { handle, type_name } => {
                        ContextValue::Handle(StoredHandle::downgrade(&handle, type_name))
                    }
                };
                (name, value)
            })
            .collect();

        ContextSnapshot::successor(previous, values)
    }

    /// Returns the client handle.
    #[must_use]
    pub const fn client(&self) -> &ClientHandle {
        &self.client
    }

    /// Returns the ID of the snapshot this scope was restored from.
    #[must_use]
    pub const fn snapshot_id(&self) -> Uuid {
        self.snapshot_id
    }

    /// Returns the generation of the snapshot this scope was restored from.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Reads a data variable.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::ContextValue` if the variable is a handle or
    /// does not deserialize into `T`.
    pub fn get<T: DeserializeOwned>(&self, var: &ContextVar<T>) -> Result<Option<T>, ActionError> {
        match self.values.get(var.name()) {
            None => Ok(None),
            Some(LiveValue::Data(value)) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| ActionError::context_value(var.name(), e.to_string())),
            Some(LiveValue::Handle { .. }) => Err(ActionError::context_value(
                var.name(),
                "expected data, found a handle",
            )),
        }
    }

    /// Writes a data variable, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::ContextValue` if the value cannot be serialized.
    pub fn set<T: Serialize>(&mut self, var: &ContextVar<T>, value: &T) -> Result<(), ActionError> {
        let value = serde_json::to_value(value)
            .map_err(|e| ActionError::context_value(var.name(), e.to_string()))?;
        self.values.insert(var.name().to_string(), LiveValue::Data(value));
        Ok(())
    }

    /// Reads a handle variable.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::ContextValue` if the variable is data or a
    /// handle of another type.
    pub fn handle<T: Any + Send + Sync>(
        &self,
        var: &ContextVar<T>,
    ) -> Result<Option<Arc<T>>, ActionError> {
        match self.values.get(var.name()) {
            None => Ok(None),
            Some(LiveValue::Handle {
                handle,
                type_name: found,
            }) => Arc::clone(handle)
                .downcast::<T>()
                .map(Some)
                .map_err(|_| {
                    ActionError::context_value(
                        var.name(),
                        format!("expected {}, found {found}", type_name::<T>()),
                    )
                }),
            Some(LiveValue::Data(_)) => Err(ActionError::context_value(
                var.name(),
                "expected a handle, found data",
            )),
        }
    }

    /// Records a handle variable.
    ///
    /// Only a weak reference survives capture; the caller keeps ownership.
    pub fn set_handle<T: Any + Send + Sync>(&mut self, var: &ContextVar<T>, handle: Arc<T>) {
        let handle: Arc<dyn Any + Send + Sync> = handle;
        self.values.insert(
            var.name().to_string(),
            LiveValue::Handle {
                handle,
                type_name: type_name::<T>(),
            },
        );
    }

    /// Reads a data variable without decoding it.
    #[must_use]
    pub fn get_value(&self, name: &str) -> Option<&serde_json::Value> {
        match self.values.get(name) {
            Some(LiveValue::Data(value)) => Some(value),
            _ => None,
        }
    }

    /// Writes a data variable without a typed key.
    pub fn set_value(&mut self, name: impl Into<String>, value: serde_json::Value) {
        self.values.insert(name.into(), LiveValue::Data(value));
    }

    /// Removes a variable. Returns whether it existed.
    pub fn remove(&mut self, name: &str) -> bool {
        self.values.remove(name).is_some()
    }

    /// Checks if a variable exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns variable names, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl std::fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionContext")
            .field("snapshot_id", &self.snapshot_id)
            .field("generation", &self.generation)
            .field("keys", &self.keys())
            .finish_non_exhaustive()
    }
}
