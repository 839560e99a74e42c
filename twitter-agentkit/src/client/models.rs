//! Twitter API models.

use serde::{Deserialize, Serialize};

/// A Twitter user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitterUser {
    /// The user ID.
    pub id: String,
    /// The display name.
    pub name: String,
    /// The handle, without `@`.
    pub username: String,
}

impl TwitterUser {
    /// Creates a new user.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            username: username.into(),
        }
    }

    /// Returns the public profile URL.
    #[must_use]
    pub fn profile_url(&self) -> String {
        format!("https://x.com/{}", self.username)
    }
}

/// A tweet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    /// The tweet ID.
    pub id: String,
    /// The tweet text.
    pub text: String,
    /// The author's user ID, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
}

impl Tweet {
    /// Creates a new tweet.
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            author_id: None,
        }
    }

    /// Sets the author.
    #[must_use]
    pub fn with_author(mut self, author_id: impl Into<String>) -> Self {
        self.author_id = Some(author_id.into());
        self
    }

    /// Numeric ordering key; IDs are snowflakes and grow over time.
    #[must_use]
    pub fn sort_key(&self) -> u64 {
        self.id.parse().unwrap_or(0)
    }
}

/// Parameters for a mentions lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MentionsQuery {
    /// The mentioned user's ID.
    pub user_id: String,
    /// Only return mentions newer than this tweet ID.
    pub since_id: Option<String>,
}

impl MentionsQuery {
    /// Creates a query for a user.
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            since_id: None,
        }
    }

    /// Restricts the query to mentions newer than `since_id`.
    #[must_use]
    pub fn since(mut self, since_id: impl Into<String>) -> Self {
        self.since_id = Some(since_id.into());
        self
    }
}

/// A tweet to be posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTweet {
    /// The text to post.
    pub text: String,
    /// The tweet being replied to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_reply_to_tweet_id: Option<String>,
}

impl NewTweet {
    /// A standalone tweet.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            in_reply_to_tweet_id: None,
        }
    }

    /// A reply to `tweet_id`.
    #[must_use]
    pub fn reply(text: impl Into<String>, tweet_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            in_reply_to_tweet_id: Some(tweet_id.into()),
        }
    }

    /// The v2 request body.
    #[must_use]
    pub fn to_request_body(&self) -> serde_json::Value {
        match &self.in_reply_to_tweet_id {
            Some(id) => serde_json::json!({
                "text": self.text,
                "reply": { "in_reply_to_tweet_id": id },
            }),
            None => serde_json::json!({ "text": self.text }),
        }
    }
}

/// The `{"data": ...}` envelope every v2 response uses.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct DataEnvelope<T> {
    #[serde(default)]
    pub data: Option<T>,
}
