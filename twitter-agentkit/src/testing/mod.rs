//! Testing utilities for code built on the wrapper.
//!
//! This module provides:
//! - An in-memory `TwitterClient` with scripted mentions and failures
//! - A client factory that hands out a prebuilt client
//! - Fake credential fixtures

mod fixtures;
mod mocks;

pub use fixtures::{fake_credentials, fake_env, test_wrapper};
pub use mocks::{InMemoryTwitterClient, StaticClientFactory};
