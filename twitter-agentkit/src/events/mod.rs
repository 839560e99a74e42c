//! Event sinks for wrapper observability.
//!
//! The wrapper reports each action call and each context hand-off to the
//! sink it was built with. Sinks are passed explicitly; there is no global.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// Emitted before an action is invoked.
pub const ACTION_STARTED: &str = "action.started";
/// Emitted when an action returns a response.
pub const ACTION_COMPLETED: &str = "action.completed";
/// Emitted when an action returns an error.
pub const ACTION_FAILED: &str = "action.failed";
/// Emitted after the context is restored from the current snapshot.
pub const CONTEXT_RESTORED: &str = "context.restored";
/// Emitted after a new snapshot replaces the current one.
pub const CONTEXT_CAPTURED: &str = "context.captured";
/// Emitted when the current snapshot cannot be restored.
pub const CONTEXT_RESTORE_FAILED: &str = "context.restore_failed";
