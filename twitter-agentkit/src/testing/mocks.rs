//! In-memory stand-ins for the Twitter API.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::client::{
    ClientFactory, ClientHandle, MentionsQuery, NewTweet, Tweet, TwitterClient, TwitterUser,
};
use crate::config::{Credentials, Settings};
use crate::errors::{ClientError, ConfigurationError};

/// A `TwitterClient` backed by in-process state.
///
/// Mentions are served oldest first and respect `since_id`. Posted tweets
/// get increasing numeric IDs and are recorded.
#[derive(Debug)]
pub struct InMemoryTwitterClient {
    me: TwitterUser,
    mentions: Mutex<Vec<Tweet>>,
    posted: Mutex<Vec<NewTweet>>,
    failure: Mutex<Option<ClientError>>,
    next_id: AtomicU64,
    calls: AtomicU64,
}

impl Default for InMemoryTwitterClient {
    fn default() -> Self {
        Self::with_user(TwitterUser::new("1853889445319331840", "CDP AgentKit", "CDPAgentKit"))
    }
}

impl InMemoryTwitterClient {
    /// Creates a client for a default test user.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a client authenticated as `me`.
    #[must_use]
    pub fn with_user(me: TwitterUser) -> Self {
        Self {
            me,
            mentions: Mutex::new(Vec::new()),
            posted: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            next_id: AtomicU64::new(1_000),
            calls: AtomicU64::new(0),
        }
    }

    /// Adds a mention served to every account.
    pub fn add_mention(&self, tweet: Tweet) {
        self.mentions.lock().push(tweet);
    }

    /// Makes every later call fail with `error`.
    pub fn fail_with(&self, error: ClientError) {
        *self.failure.lock() = Some(error);
    }

    /// Clears a failure set by [`fail_with`](Self::fail_with).
    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    /// Returns the tweets posted so far.
    #[must_use]
    pub fn posted(&self) -> Vec<NewTweet> {
        self.posted.lock().clone()
    }

    /// Returns how many API calls were made.
    #[must_use]
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin_call(&self) -> Result<(), ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().as_ref() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TwitterClient for InMemoryTwitterClient {
    async fn get_me(&self) -> Result<TwitterUser, ClientError> {
        self.begin_call()?;
        Ok(self.me.clone())
    }

    async fn get_users_mentions(&self, query: &MentionsQuery) -> Result<Vec<Tweet>, ClientError> {
        self.begin_call()?;
        let since = query
            .since_id
            .as_deref()
            .and_then(|id| id.parse::<u64>().ok())
            .unwrap_or(0);

        let mut mentions: Vec<Tweet> = self
            .mentions
            .lock()
            .iter()
            .filter(|tweet| tweet.sort_key() > since)
            .cloned()
            .collect();
        mentions.sort_by_key(Tweet::sort_key);
        Ok(mentions)
    }

    async fn create_tweet(&self, tweet: &NewTweet) -> Result<Tweet, ClientError> {
        self.begin_call()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.posted.lock().push(tweet.clone());
        Ok(Tweet::new(id.to_string(), tweet.text.clone()).with_author(self.me.id.clone()))
    }
}

/// A `ClientFactory` that always returns the same client.
#[derive(Clone)]
pub struct StaticClientFactory {
    client: ClientHandle,
}

impl StaticClientFactory {
    /// Creates a factory for `client`.
    #[must_use]
    pub fn new(client: ClientHandle) -> Self {
        Self { client }
    }

    /// Creates a factory backed by a fresh [`InMemoryTwitterClient`], returning both.
    #[must_use]
    pub fn in_memory() -> (Self, Arc<InMemoryTwitterClient>) {
        let client = Arc::new(InMemoryTwitterClient::new());
        (Self::new(client.clone()), client)
    }
}

impl ClientFactory for StaticClientFactory {
    fn build(&self, _credentials: &Credentials, _settings: &Settings) -> Result<ClientHandle, ConfigurationError> {
        Ok(Arc::clone(&self.client))
    }
}

impl std::fmt::Debug for StaticClientFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticClientFactory").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mentions_respect_since_id() {
        let client = InMemoryTwitterClient::new();
        client.add_mention(Tweet::new("3", "c"));
        client.add_mention(Tweet::new("1", "a"));
        client.add_mention(Tweet::new("2", "b"));

        let all = client.get_users_mentions(&MentionsQuery::new("42")).await.unwrap();
        assert_eq!(all.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["1", "2", "3"]);

        let newer = client
            .get_users_mentions(&MentionsQuery::new("42").since("2"))
            .await
            .unwrap();
        assert_eq!(newer.len(), 1);
        assert_eq!(newer[0].id, "3");
    }

    #[tokio::test]
    async fn test_create_tweet_records_posts() {
        let client = InMemoryTwitterClient::new();
        let first = client.create_tweet(&NewTweet::new("one")).await.unwrap();
        let second = client.create_tweet(&NewTweet::reply("two", &first.id)).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(client.posted().len(), 2);
        assert_eq!(client.posted()[1].in_reply_to_tweet_id.as_deref(), Some(first.id.as_str()));
        assert_eq!(client.call_count(), 2);
    }

    #[test]
    fn test_failure_and_recovery() {
        let client = InMemoryTwitterClient::new();
        client.fail_with(ClientError::Transport("down".into()));
        tokio_test::assert_err!(tokio_test::block_on(client.get_me()));

        client.recover();
        let me = tokio_test::assert_ok!(tokio_test::block_on(client.get_me()));
        assert_eq!(me.username, "CDPAgentKit");
    }

    #[test]
    fn test_static_factory_returns_same_client() {
        let (factory, _client) = StaticClientFactory::in_memory();
        let credentials = crate::testing::fake_credentials()
            .resolve(&crate::config::MapEnv::new())
            .unwrap();

        let a = factory.build(&credentials, &Settings::default()).unwrap();
        let b = factory.build(&credentials, &Settings::default()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
