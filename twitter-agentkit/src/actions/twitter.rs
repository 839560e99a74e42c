//! Built-in Twitter actions.
//!
//! Responses are plain text meant to be handed back to a language model.
//! Client failures are returned as errors, never folded into the text.

use super::{Action, ActionArgs, ActionDefinition, MentionsMonitor};
use crate::client::{MentionsQuery, NewTweet};
use crate::config::Settings;
use crate::context::{ActionContext, ContextVar};
use crate::errors::ActionError;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Maximum tweet length in characters.
pub const TWEET_MAX_LENGTH: usize = 280;

/// Where the running mentions monitor is recorded in the context.
pub const MONITOR_VAR: ContextVar<MentionsMonitor> = ContextVar::new("monitor-thread");

fn validate_tweet_text(name: &str, text: &str) -> Result<(), ActionError> {
    let length = text.chars().count();
    if length == 0 {
        return Err(ActionError::invalid_arguments(format!("'{name}' must not be empty")));
    }
    if length > TWEET_MAX_LENGTH {
        return Err(ActionError::invalid_arguments(format!(
            "'{name}' is {length} characters, the limit is {TWEET_MAX_LENGTH}"
        )));
    }
    Ok(())
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> Result<String, ActionError> {
    serde_json::to_string_pretty(value).map_err(|e| ActionError::Other(e.into()))
}

/// Returns every built-in Twitter action.
#[must_use]
pub fn all_twitter_actions(settings: &Settings) -> Vec<Arc<dyn Action>> {
    vec![
        Arc::new(AccountDetails),
        Arc::new(AccountMentions),
        Arc::new(PostTweet),
        Arc::new(PostTweetReply),
        Arc::new(MentionsMonitorStart::new(settings.monitor_interval())),
        Arc::new(MentionsMonitorStop),
        Arc::new(MentionsMonitorDrain),
    ]
}

/// `account_details`: the authenticated user.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountDetails;

#[async_trait]
impl Action for AccountDetails {
    fn name(&self) -> &str {
        "account_details"
    }

    fn definition(&self) -> ActionDefinition {
        ActionDefinition::new(self.name()).with_description(
            "This tool will return account details for the currently authenticated Twitter (X) user context.\n\n\
             A successful response will return a message with the api response as a json payload:\n\
             {\"data\": {\"id\": \"1853889445319331840\", \"name\": \"CDP AgentKit\", \"username\": \"CDPAgentKit\"}}",
        )
    }

    async fn invoke(&self, ctx: &mut ActionContext, _args: ActionArgs) -> Result<String, ActionError> {
        let user = ctx.client().get_me().await?;
        let payload = json!({
            "data": {
                "id": user.id,
                "name": user.name,
                "username": user.username,
                "url": user.profile_url(),
            }
        });

        Ok(format!(
            "Successfully retrieved authenticated user account details:\n{}",
            to_pretty_json(&payload)?
        ))
    }
}

/// `account_mentions`: recent mentions of a user.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountMentions;

#[async_trait]
impl Action for AccountMentions {
    fn name(&self) -> &str {
        "account_mentions"
    }

    fn definition(&self) -> ActionDefinition {
        ActionDefinition::new(self.name())
            .with_description(
                "This tool will return mentions for the specified Twitter (X) user id.\n\n\
                 A successful response will return a message with the API response as a JSON payload.\n\
                 A failure response will return a message with the Twitter API request error.",
            )
            .with_args_schema(json!({
                "type": "object",
                "properties": {
                    "account_id": {
                        "type": "string",
                        "description": "The account id for the Twitter (X) user to get mentions for"
                    }
                },
                "required": ["account_id"]
            }))
    }

    async fn invoke(&self, ctx: &mut ActionContext, args: ActionArgs) -> Result<String, ActionError> {
        let account_id = args.required_str("account_id")?;
        let mentions = ctx
            .client()
            .get_users_mentions(&MentionsQuery::new(account_id))
            .await?;

        Ok(format!(
            "Successfully retrieved account mentions:\n{}",
            to_pretty_json(&json!({ "data": mentions }))?
        ))
    }
}

/// `post_tweet`: posts a tweet.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostTweet;

#[async_trait]
impl Action for PostTweet {
    fn name(&self) -> &str {
        "post_tweet"
    }

    fn definition(&self) -> ActionDefinition {
        ActionDefinition::new(self.name())
            .with_description(
                "This tool will post a tweet on Twitter. The tool takes the text of the tweet as input. \
                 Tweets can be maximum 280 characters.",
            )
            .with_args_schema(json!({
                "type": "object",
                "properties": {
                    "tweet": {
                        "type": "string",
                        "maxLength": TWEET_MAX_LENGTH,
                        "description": "The text of the tweet to post to Twitter. Tweets can be maximum 280 characters."
                    }
                },
                "required": ["tweet"]
            }))
    }

    async fn invoke(&self, ctx: &mut ActionContext, args: ActionArgs) -> Result<String, ActionError> {
        let text = args.required_str("tweet")?;
        validate_tweet_text("tweet", text)?;

        let tweet = ctx.client().create_tweet(&NewTweet::new(text)).await?;
        info!(tweet_id = %tweet.id, "posted tweet");

        Ok(format!(
            "Successfully posted to Twitter:\n{}",
            to_pretty_json(&json!({ "data": tweet }))?
        ))
    }
}

/// `post_tweet_reply`: replies to a tweet.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostTweetReply;

#[async_trait]
impl Action for PostTweetReply {
    fn name(&self) -> &str {
        "post_tweet_reply"
    }

    fn definition(&self) -> ActionDefinition {
        ActionDefinition::new(self.name())
            .with_description(
                "This tool will post a reply to a tweet on Twitter. The tool takes the text of the reply \
                 and the tweet id to reply to as input. Tweets can be maximum 280 characters.",
            )
            .with_args_schema(json!({
                "type": "object",
                "properties": {
                    "tweet_id": {
                        "type": "string",
                        "description": "The tweet id to post a reply to twitter"
                    },
                    "tweet_reply": {
                        "type": "string",
                        "maxLength": TWEET_MAX_LENGTH,
                        "description": "The text of the tweet to post in reply to another tweet on twitter."
                    }
                },
                "required": ["tweet_id", "tweet_reply"]
            }))
    }

    async fn invoke(&self, ctx: &mut ActionContext, args: ActionArgs) -> Result<String, ActionError> {
        let tweet_id = args.required_str("tweet_id")?;
        let text = args.required_str("tweet_reply")?;
        validate_tweet_text("tweet_reply", text)?;

        let tweet = ctx
            .client()
            .create_tweet(&NewTweet::reply(text, tweet_id))
            .await?;
        info!(tweet_id = %tweet.id, in_reply_to = %tweet_id, "posted reply");

        Ok(format!(
            "Successfully posted reply to Twitter:\n{}",
            to_pretty_json(&json!({ "data": tweet }))?
        ))
    }
}

/// `mentions_monitor_start`: starts polling mentions in the background.
#[derive(Debug, Clone, Copy)]
pub struct MentionsMonitorStart {
    default_interval: Duration,
}

impl MentionsMonitorStart {
    /// Creates the action with a default polling interval.
    #[must_use]
    pub const fn new(default_interval: Duration) -> Self {
        Self { default_interval }
    }
}

impl Default for MentionsMonitorStart {
    fn default() -> Self {
        Self::new(Settings::default().monitor_interval())
    }
}

#[async_trait]
impl Action for MentionsMonitorStart {
    fn name(&self) -> &str {
        "mentions_monitor_start"
    }

    fn definition(&self) -> ActionDefinition {
        ActionDefinition::new(self.name())
            .with_description(
                "This tool starts monitoring mentions of the given Twitter (X) account in the background. \
                 Collected mentions can be read later with mentions_monitor_drain.",
            )
            .with_args_schema(json!({
                "type": "object",
                "properties": {
                    "account_id": {
                        "type": "string",
                        "description": "The account id for the Twitter (X) user to monitor"
                    },
                    "interval_secs": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "Seconds between polls"
                    }
                },
                "required": ["account_id"]
            }))
    }

    async fn invoke(&self, ctx: &mut ActionContext, args: ActionArgs) -> Result<String, ActionError> {
        let account_id = args.required_str("account_id")?;
        let interval = args
            .optional_u64("interval_secs")?
            .map_or(self.default_interval, Duration::from_secs);
        if interval.is_zero() {
            return Err(ActionError::invalid_arguments(
                "the polling interval must be at least 1 second",
            ));
        }

        if let Some(existing) = ctx.handle(&MONITOR_VAR)? {
            if existing.is_running() {
                return Ok(format!(
                    "Mentions monitor is already running for account {}.",
                    existing.account_id()
                ));
            }
        }

        let monitor = MentionsMonitor::spawn(Arc::clone(ctx.client()), account_id, interval);
        ctx.set_handle(&MONITOR_VAR, monitor);

        Ok(format!(
            "Started monitoring mentions for account {account_id} every {}s.",
            interval.as_secs()
        ))
    }
}

/// `mentions_monitor_stop`: stops the running monitor.
#[derive(Debug, Clone, Copy, Default)]
pub struct MentionsMonitorStop;

#[async_trait]
impl Action for MentionsMonitorStop {
    fn name(&self) -> &str {
        "mentions_monitor_stop"
    }

    fn definition(&self) -> ActionDefinition {
        ActionDefinition::new(self.name())
            .with_description("This tool stops the background mentions monitor, if one is running.")
    }

    async fn invoke(&self, ctx: &mut ActionContext, _args: ActionArgs) -> Result<String, ActionError> {
        let Some(monitor) = ctx.handle(&MONITOR_VAR)? else {
            return Ok("No mentions monitor is running.".to_string());
        };

        monitor.stop();
        ctx.remove(MONITOR_VAR.name());

        Ok(format!(
            "Stopped monitoring mentions for account {} after {} polls.",
            monitor.account_id(),
            monitor.polls()
        ))
    }
}

/// `mentions_monitor_drain`: returns mentions collected so far.
#[derive(Debug, Clone, Copy, Default)]
pub struct MentionsMonitorDrain;

#[async_trait]
impl Action for MentionsMonitorDrain {
    fn name(&self) -> &str {
        "mentions_monitor_drain"
    }

    fn definition(&self) -> ActionDefinition {
        ActionDefinition::new(self.name()).with_description(
            "This tool returns the mentions collected by the background monitor since the last call.",
        )
    }

    async fn invoke(&self, ctx: &mut ActionContext, _args: ActionArgs) -> Result<String, ActionError> {
        let Some(monitor) = ctx.handle(&MONITOR_VAR)? else {
            return Err(ActionError::failed(
                "No mentions monitor is running. Start one with mentions_monitor_start.",
            ));
        };

        let mentions = monitor.queue().drain();
        let mut response = format!(
            "Collected {} new mentions:\n{}",
            mentions.len(),
            to_pretty_json(&json!({ "data": mentions }))?
        );
        if let Some(error) = monitor.last_error() {
            response.push_str(&format!("\nLast poll failed: {error}"));
        }

        Ok(response)
    }
}
