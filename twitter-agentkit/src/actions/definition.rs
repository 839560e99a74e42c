//! Action definitions exposed to an orchestration layer.

use serde::{Deserialize, Serialize};

/// Describes an action: its name, purpose and argument schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// The action name.
    pub name: String,
    /// What the action does, written for a language model.
    pub description: String,
    /// JSON Schema for the arguments.
    pub args_schema: serde_json::Value,
}

impl ActionDefinition {
    /// Creates a definition that takes no arguments.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            args_schema: serde_json::json!({"type": "object", "properties": {}}),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Sets the argument schema.
    #[must_use]
    pub fn with_args_schema(mut self, schema: serde_json::Value) -> Self {
        self.args_schema = schema;
        self
    }

    /// Renders the definition as an OpenAI-style function tool.
    #[must_use]
    pub fn to_tool_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.args_schema,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_schema() {
        let def = ActionDefinition::new("post_tweet")
            .with_description("Post a tweet")
            .with_args_schema(serde_json::json!({
                "type": "object",
                "properties": {"tweet": {"type": "string"}},
                "required": ["tweet"],
            }));

        let schema = def.to_tool_schema();
        assert_eq!(schema["function"]["name"], "post_tweet");
        assert_eq!(schema["function"]["parameters"]["required"][0], "tweet");
    }
}
