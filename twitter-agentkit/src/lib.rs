//! # twitter-agentkit
//!
//! A stateful wrapper that runs agent actions against the Twitter (X) API
//! and carries call-local context from one action to the next.
//!
//! - **Explicit context propagation**: every call restores the previous
//!   snapshot into an [`context::ActionContext`], runs the action, and
//!   captures the result as the next snapshot
//! - **Credential resolution**: explicit values with environment fallbacks
//! - **Built-in actions**: account details, mentions, tweets, replies and a
//!   background mentions monitor
//! - **Tool-call resolution**: run OpenAI-style tool calls by name
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use twitter_agentkit::prelude::*;
//!
//! let wrapper = TwitterApiWrapper::from_env()?;
//!
//! let me = wrapper.execute_named("account_details", ActionArgs::new()).await?;
//! let posted = wrapper
//!     .execute_named("post_tweet", ActionArgs::new().with("tweet", "gm"))
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod actions;
pub mod client;
pub mod config;
pub mod context;
pub mod errors;
pub mod events;
pub mod observability;
pub mod testing;
pub mod wrapper;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::actions::twitter::{all_twitter_actions, MONITOR_VAR, TWEET_MAX_LENGTH};
    pub use crate::actions::{
        action_fn, Action, ActionArgs, ActionDefinition, ActionRegistry, MentionsMonitor,
    };
    pub use crate::client::{
        ClientFactory, ClientHandle, Tweet, TwitterClient, TwitterUser,
    };
    pub use crate::config::{
        CredentialKey, Credentials, CredentialsConfig, EnvSource, MapEnv, ProcessEnv, Settings,
    };
    pub use crate::context::{ActionContext, ContextSnapshot, ContextVar};
    pub use crate::errors::{
        ActionError, AgentkitError, ClientError, ConfigurationError, ContextRestoreError,
        ExecuteError,
    };
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::observability::{init_logging, LogFormat, LoggingConfig};
    pub use crate::wrapper::{TwitterApiWrapper, TwitterApiWrapperBuilder};
}
