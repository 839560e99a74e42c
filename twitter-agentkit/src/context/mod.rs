//! Context propagation between action invocations.
//!
//! This module provides:
//! - Immutable snapshots of call-local state
//! - The request-scoped `ActionContext` actions run against
//! - Typed keys for context variables

#[cfg(test)]
mod context_tests;
mod scope;
mod snapshot;
mod vars;

pub use scope::ActionContext;
pub use snapshot::{ContextSnapshot, ContextValue, StoredHandle};
pub use vars::ContextVar;
