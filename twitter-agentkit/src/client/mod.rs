//! The Twitter client handle.
//!
//! The wrapper treats the client as a black box that issues requests on
//! behalf of the authenticated user. It is built once by a
//! [`ClientFactory`] and shared by reference from then on.

mod factory;
#[cfg(feature = "http")]
mod http;
mod models;
#[cfg(feature = "http")]
mod oauth;

pub use factory::ClientFactory;
#[cfg(feature = "http")]
pub use factory::HttpClientFactory;
#[cfg(feature = "http")]
pub use http::HttpTwitterClient;
pub use models::{MentionsQuery, NewTweet, Tweet, TwitterUser};

use crate::errors::ClientError;
use async_trait::async_trait;
use std::sync::Arc;

/// A shared, ready-to-use client.
pub type ClientHandle = Arc<dyn TwitterClient>;

/// Requests the built-in actions need from Twitter.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TwitterClient: Send + Sync {
    /// Returns the authenticated user.
    async fn get_me(&self) -> Result<TwitterUser, ClientError>;

    /// Returns recent tweets mentioning a user, newest first.
    async fn get_users_mentions(&self, query: &MentionsQuery) -> Result<Vec<Tweet>, ClientError>;

    /// Posts a tweet or a reply.
    async fn create_tweet(&self, tweet: &NewTweet) -> Result<Tweet, ClientError>;
}
