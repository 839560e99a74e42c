//! Action registry and tool-call resolution.

use super::{Action, ActionArgs, ActionDefinition};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A tool call resolved to a registered action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedActionCall {
    /// The call ID.
    pub id: String,
    /// The action name.
    pub name: String,
    /// The parsed arguments.
    pub arguments: ActionArgs,
    /// The original raw call.
    pub raw: serde_json::Value,
}

/// A tool call that failed parsing or resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnresolvedActionCall {
    /// The call ID if available.
    pub id: Option<String>,
    /// The action name if available.
    pub name: Option<String>,
    /// The error message.
    pub error: String,
    /// The original raw call.
    pub raw: serde_json::Value,
}

/// Registry of actions by name.
#[derive(Default)]
pub struct ActionRegistry {
    actions: RwLock<HashMap<String, Arc<dyn Action>>>,
}

impl ActionRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action, returning any action it replaced.
    pub fn register(&self, action: Arc<dyn Action>) -> Option<Arc<dyn Action>> {
        let name = action.name().to_string();
        self.actions.write().insert(name, action)
    }

    /// Registers several actions.
    pub fn register_all(&self, actions: impl IntoIterator<Item = Arc<dyn Action>>) {
        let mut map = self.actions.write();
        for action in actions {
            map.insert(action.name().to_string(), action);
        }
    }

    /// Gets an action by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.read().get(name).cloned()
    }

    /// Checks if an action is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.actions.read().contains_key(name)
    }

    /// Lists registered action names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.actions.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns every registered definition, sorted by name.
    #[must_use]
    pub fn definitions(&self) -> Vec<ActionDefinition> {
        let mut defs: Vec<ActionDefinition> =
            self.actions.read().values().map(|a| a.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Returns the number of registered actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.read().len()
    }

    /// Returns true if no actions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.read().is_empty()
    }

    /// Parses and resolves OpenAI-style tool calls.
    pub fn parse_and_resolve(
        &self,
        calls: &[serde_json::Value],
    ) -> Vec<Result<ResolvedActionCall, UnresolvedActionCall>> {
        calls.iter().map(|call| self.resolve_call(call)).collect()
    }

    /// Resolves one tool call of the form
    /// `{"id": ..., "function": {"name": ..., "arguments": ...}}`.
    ///
    /// Arguments may be a JSON string or an object.
    pub fn resolve_call(
        &self,
        call: &serde_json::Value,
    ) -> Result<ResolvedActionCall, UnresolvedActionCall> {
        let id = call.get("id").and_then(|v| v.as_str()).map(String::from);
        let unresolved = |name: Option<String>, error: &str| UnresolvedActionCall {
            id: id.clone(),
            name,
            error: error.to_string(),
            raw: call.clone(),
        };

        let Some(func_obj) = call.get("function") else {
            return Err(unresolved(None, "Missing function wrapper"));
        };

        let Some(name) = func_obj.get("name").and_then(|v| v.as_str()).map(String::from) else {
            return Err(unresolved(None, "Missing action name"));
        };

        let raw_args = match func_obj.get("arguments") {
            Some(serde_json::Value::String(s)) if s.trim().is_empty() => serde_json::json!({}),
            Some(serde_json::Value::String(s)) => match serde_json::from_str(s) {
                Ok(args) => args,
                Err(_) => return Err(unresolved(Some(name), "Invalid JSON in arguments")),
            },
            Some(other) => other.clone(),
            None => serde_json::json!({}),
        };

        let Ok(arguments) = ActionArgs::from_value(raw_args) else {
            return Err(unresolved(Some(name), "Arguments must be a JSON object"));
        };

        if !self.contains(&name) {
            let error = format!("No action registered with name '{name}'");
            return Err(unresolved(Some(name), &error));
        }

        Ok(ResolvedActionCall {
            id: id.clone().unwrap_or_default(),
            name,
            arguments,
            raw: call.clone(),
        })
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}
