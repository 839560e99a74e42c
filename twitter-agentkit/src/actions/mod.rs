//! Actions: units of work run against an [`ActionContext`].
//!
//! This module provides:
//! - The `Action` trait and a closure adapter
//! - Named arguments and definitions
//! - A registry that resolves raw tool calls
//! - The built-in Twitter actions and the mentions monitor they manage

mod args;
mod definition;
mod monitor;
mod registry;
pub mod twitter;

pub use args::ActionArgs;
pub use definition::ActionDefinition;
pub use monitor::{MentionsMonitor, MentionsQueue, MIN_POLL_INTERVAL};
pub use registry::{ActionRegistry, ResolvedActionCall, UnresolvedActionCall};

use crate::context::ActionContext;
use crate::errors::ActionError;
use async_trait::async_trait;

/// A unit of work the wrapper can execute.
///
/// The action receives the restored call-local context by `&mut`; whatever
/// it leaves there becomes the next snapshot.
#[async_trait]
pub trait Action: Send + Sync {
    /// Returns the action's name.
    fn name(&self) -> &str;

    /// Returns the action's definition.
    fn definition(&self) -> ActionDefinition;

    /// Runs the action.
    async fn invoke(&self, ctx: &mut ActionContext, args: ActionArgs) -> Result<String, ActionError>;
}

/// An action backed by a synchronous closure.
pub struct FnAction<F> {
    definition: ActionDefinition,
    func: F,
}

impl<F> FnAction<F>
where
    F: Fn(&mut ActionContext, &ActionArgs) -> Result<String, ActionError> + Send + Sync,
{
    /// Creates a closure-backed action.
    #[must_use]
    pub fn new(definition: ActionDefinition, func: F) -> Self {
        Self { definition, func }
    }

    /// Sets the argument schema.
    #[must_use]
    pub fn with_args_schema(mut self, schema: serde_json::Value) -> Self {
        self.definition.args_schema = schema;
        self
    }
}

/// Wraps a closure as an [`Action`].
#[must_use]
pub fn action_fn<F>(name: impl Into<String>, description: impl Into<String>, func: F) -> FnAction<F>
where
    F: Fn(&mut ActionContext, &ActionArgs) -> Result<String, ActionError> + Send + Sync,
{
    FnAction::new(
        ActionDefinition::new(name).with_description(description),
        func,
    )
}

#[async_trait]
impl<F> Action for FnAction<F>
where
    F: Fn(&mut ActionContext, &ActionArgs) -> Result<String, ActionError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn definition(&self) -> ActionDefinition {
        self.definition.clone()
    }

    async fn invoke(&self, ctx: &mut ActionContext, args: ActionArgs) -> Result<String, ActionError> {
        (self.func)(ctx, &args)
    }
}

impl<F> std::fmt::Debug for FnAction<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnAction")
            .field("name", &self.definition.name)
            .finish_non_exhaustive()
    }
}
