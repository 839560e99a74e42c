//! The stateful action wrapper.
//!
//! [`TwitterApiWrapper`] owns one Twitter client and one current
//! [`ContextSnapshot`]. Every call restores the snapshot into a fresh
//! [`ActionContext`], runs the action against it, and captures the result
//! as the next snapshot. Calls on one wrapper are serialized.


use crate::actions::twitter::all_twitter_actions;
use crate::actions::{Action, ActionArgs, ActionDefinition, ActionRegistry};
use crate::client::{ClientFactory, ClientHandle};
use crate::config::{CredentialKey, CredentialsConfig, EnvSource, ProcessEnv, Settings};
use crate::context::{ActionContext, ContextSnapshot};
use crate::errors::{ConfigurationError, ExecuteError};
use crate::events::{
    EventSink, NoOpEventSink, ACTION_COMPLETED, ACTION_FAILED, ACTION_STARTED, CONTEXT_CAPTURED,
    CONTEXT_RESTORED, CONTEXT_RESTORE_FAILED,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Runs actions against a Twitter client while carrying call-local context
/// from one call to the next.
pub struct TwitterApiWrapper {
    client: ClientHandle,
    settings: Settings,
    registry: ActionRegistry,
    event_sink: Arc<dyn EventSink>,
    current: Mutex<ContextSnapshot>,
}

impl TwitterApiWrapper {
    /// Builds a wrapper from explicit credentials, falling back to the
    /// process environment for missing keys.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if any credential is absent from both
    /// sources, or the client cannot be built.
    pub fn new(credentials: CredentialsConfig) -> Result<Self, ConfigurationError> {
        Self::builder().with_credentials(credentials).build()
    }

    /// Builds a wrapper from the process environment alone.
    ///
    /// # Errors
    ///
    /// See [`TwitterApiWrapper::new`].
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::builder().build()
    }

    /// Returns a builder.
    #[must_use]
    pub fn builder() -> TwitterApiWrapperBuilder {
        TwitterApiWrapperBuilder::new()
    }

    /// Runs `action` against the current context.
    ///
    /// The context is re-captured whether the action succeeds or fails.
    /// The action's response or error is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ExecuteError::Restore` if the current snapshot cannot be
    /// restored (the action is not run and the snapshot is kept), or
    /// `ExecuteError::Action` with whatever the action returned.
    #[instrument(skip_all, fields(action = %action.name()))]
    pub async fn execute(&self, action: &dyn Action, args: ActionArgs) -> Result<String, ExecuteError> {
        let mut current = self.current.lock().await;
        let name = action.name().to_string();

        let mut ctx = match ActionContext::restore(&current, &self.client) {
            Ok(ctx) => ctx,
            Err(err) => {
                warn!(variable = %err.variable, reason = %err.reason, "context restore failed");
                self.event_sink.try_emit(
                    CONTEXT_RESTORE_FAILED,
                    Some(json!({
                        "action": name,
                        "snapshot_id": current.snapshot_id().to_string(),
                        "variable": err.variable,
                        "reason": err.reason,
                    })),
                );
                return Err(err.into());
            }
        };

        debug!(
            snapshot_id = %ctx.snapshot_id(),
            generation = ctx.generation(),
            variables = current.len(),
            "context restored"
        );
        self.event_sink.try_emit(
            CONTEXT_RESTORED,
            Some(json!({
                "snapshot_id": ctx.snapshot_id().to_string(),
                "generation": ctx.generation(),
                "variables": ctx.keys(),
            })),
        );
        self.event_sink
            .try_emit(ACTION_STARTED, Some(json!({ "action": name })));

        let started = Instant::now();
        let result = action.invoke(&mut ctx, args).await;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let next = ctx.capture(&current);
        debug!(
            snapshot_id = %next.snapshot_id(),
            generation = next.generation(),
            variables = next.len(),
            "context captured"
        );
        self.event_sink.try_emit(
            CONTEXT_CAPTURED,
            Some(json!({
                "snapshot_id": next.snapshot_id().to_string(),
                "parent_id": current.snapshot_id().to_string(),
                "generation": next.generation(),
                "variables": next.keys(),
            })),
        );
        *current = next;
        drop(current);

        match result {
            Ok(response) => {
                info!(duration_ms, "action completed");
                self.event_sink.try_emit(
                    ACTION_COMPLETED,
                    Some(json!({ "action": name, "duration_ms": duration_ms })),
                );
                Ok(response)
            }
            Err(err) => {
                warn!(duration_ms, error = %err, "action failed");
                self.event_sink.try_emit(
                    ACTION_FAILED,
                    Some(json!({
                        "action": name,
                        "duration_ms": duration_ms,
                        "error": err.to_string(),
                    })),
                );
                Err(ExecuteError::Action(err))
            }
        }
    }

    /// Runs a registered action by name.
    ///
    /// # Errors
    ///
    /// Returns `ExecuteError::NotFound` for an unknown name; otherwise as
    /// [`TwitterApiWrapper::execute`].
    pub async fn execute_named(&self, name: &str, args: ActionArgs) -> Result<String, ExecuteError> {
        let action = self
            .registry
            .get(name)
            .ok_or_else(|| ExecuteError::not_found(name))?;
        self.execute(action.as_ref(), args).await
    }

    /// Resolves an OpenAI-style tool call and runs it.
    ///
    /// # Errors
    ///
    /// Returns `ExecuteError::UnresolvedCall` if the call is malformed or names
    /// an unregistered action; otherwise as [`TwitterApiWrapper::execute`].
    pub async fn execute_tool_call(&self, call: &serde_json::Value) -> Result<String, ExecuteError> {
        let resolved = self
            .registry
            .resolve_call(call)
            .map_err(|unresolved| ExecuteError::UnresolvedCall(unresolved.error))?;
        self.execute_named(&resolved.name, resolved.arguments).await
    }

    /// Runs a batch of tool calls in order, one result per call.
    ///
    /// Each call sees the context left by the one before it, failed or not.
    pub async fn execute_tool_calls(
        &self,
        calls: &[serde_json::Value],
    ) -> Vec<Result<String, ExecuteError>> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            results.push(self.execute_tool_call(call).await);
        }
        results
    }

    /// Returns a copy of the current snapshot.
    pub async fn snapshot(&self) -> ContextSnapshot {
        self.current.lock().await.clone()
    }

    /// Drops one variable from the current snapshot.
    ///
    /// Used to recover after a handle went stale. Returns whether the
    /// variable was recorded.
    pub async fn forget(&self, name: &str) -> bool {
        let mut current = self.current.lock().await;
        let Some(next) = current.without(name) else {
            return false;
        };

        info!(variable = name, generation = next.generation(), "forgot context variable");
        self.event_sink.try_emit(
            CONTEXT_CAPTURED,
            Some(json!({
                "snapshot_id": next.snapshot_id().to_string(),
                "parent_id": current.snapshot_id().to_string(),
                "generation": next.generation(),
                "variables": next.keys(),
                "forgotten": name,
            })),
        );
        *current = next;
        true
    }

    /// Returns the shared client handle.
    #[must_use]
    pub const fn client(&self) -> &ClientHandle {
        &self.client
    }

    /// Returns the settings the wrapper was built with.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the action registry.
    #[must_use]
    pub const fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Registers an action, returning any action it replaced.
    pub fn register(&self, action: Arc<dyn Action>) -> Option<Arc<dyn Action>> {
        self.registry.register(action)
    }

    /// Returns the definitions of every registered action.
    #[must_use]
    pub fn action_definitions(&self) -> Vec<ActionDefinition> {
        self.registry.definitions()
    }
}

impl std::fmt::Debug for TwitterApiWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterApiWrapper")
            .field("settings", &self.settings)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// Builder for [`TwitterApiWrapper`].
pub struct TwitterApiWrapperBuilder {
    credentials: CredentialsConfig,
    settings: Settings,
    env: Box<dyn EnvSource>,
    client_factory: Option<Arc<dyn ClientFactory>>,
    event_sink: Arc<dyn EventSink>,
    actions: Vec<Arc<dyn Action>>,
    builtin_actions: bool,
}

impl Default for TwitterApiWrapperBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TwitterApiWrapperBuilder {
    /// Creates a builder reading the process environment, with the
    /// built-in actions enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            credentials: CredentialsConfig::new(),
            settings: Settings::default(),
            env: Box::new(ProcessEnv),
            client_factory: None,
            event_sink: Arc::new(NoOpEventSink),
            actions: Vec::new(),
            builtin_actions: true,
        }
    }

    /// Sets the explicit credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: CredentialsConfig) -> Self {
        self.credentials = credentials;
        self
    }

    /// Sets one explicit credential.
    #[must_use]
    pub fn with_credential(mut self, key: CredentialKey, value: impl Into<String>) -> Self {
        self.credentials = self.credentials.with(key, value);
        self
    }

    /// Sets the settings.
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets where missing credentials are looked up.
    #[must_use]
    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    /// Sets the client factory.
    #[must_use]
    pub fn with_client_factory(mut self, factory: Arc<dyn ClientFactory>) -> Self {
        self.client_factory = Some(factory);
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Registers an additional action.
    #[must_use]
    pub fn with_action(mut self, action: Arc<dyn Action>) -> Self {
        self.actions.push(action);
        self
    }

    /// Skips registering the built-in Twitter actions.
    #[must_use]
    pub const fn without_builtin_actions(mut self) -> Self {
        self.builtin_actions = false;
        self
    }

    /// Resolves credentials, builds the client and captures the initial
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingCredentials` listing every
    /// credential absent from both the explicit config and the environment,
    /// `ConfigurationError::Invalid` for unusable settings, or any error from
    /// the client factory.
    pub fn build(self) -> Result<TwitterApiWrapper, ConfigurationError> {
        let credentials = self.credentials.resolve(self.env.as_ref())?;
        self.settings.validate()?;
        let factory = match self.client_factory {
            Some(factory) => factory,
            None => default_client_factory()?,
        };
        let client = factory.build(&credentials, &self.settings)?;

        let registry = ActionRegistry::new();
        if self.builtin_actions {
            registry.register_all(all_twitter_actions(&self.settings));
        }
        registry.register_all(self.actions);

        let initial = ContextSnapshot::initial(Arc::clone(&client));
        info!(
            snapshot_id = %initial.snapshot_id(),
            actions = registry.len(),
            "twitter api wrapper ready"
        );

        Ok(TwitterApiWrapper {
            client,
            settings: self.settings,
            registry,
            event_sink: self.event_sink,
            current: Mutex::new(initial),
        })
    }
}

impl std::fmt::Debug for TwitterApiWrapperBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterApiWrapperBuilder")
            .field("credentials", &self.credentials)
            .field("settings", &self.settings)
            .field("actions", &self.actions.len())
            .field("builtin_actions", &self.builtin_actions)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "http")]
fn default_client_factory() -> Result<Arc<dyn ClientFactory>, ConfigurationError> {
    Ok(Arc::new(crate::client::HttpClientFactory))
}

#[cfg(not(feature = "http"))]
fn default_client_factory() -> Result<Arc<dyn ClientFactory>, ConfigurationError> {
    Err(ConfigurationError::invalid(
        "no client factory configured and the `http` feature is disabled",
    ))
}
