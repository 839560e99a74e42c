//! Background polling of account mentions.

use crate::client::{ClientHandle, MentionsQuery, Tweet};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Shortest polling period; `tokio::time::interval` rejects zero.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Mentions collected by a monitor, oldest first.
#[derive(Debug, Default)]
pub struct MentionsQueue {
    items: Mutex<VecDeque<Tweet>>,
}

impl MentionsQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends tweets, oldest first.
    pub fn push_all(&self, tweets: impl IntoIterator<Item = Tweet>) {
        self.items.lock().extend(tweets);
    }

    /// Removes and returns everything queued.
    pub fn drain(&self) -> Vec<Tweet> {
        self.items.lock().drain(..).collect()
    }

    /// Returns the number of queued tweets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

/// A running mentions poller.
///
/// The polling task owns the monitor; it is dropped once the task exits.
/// Anything else should hold it weakly or only for the length of a call.
#[derive(Debug)]
pub struct MentionsMonitor {
    account_id: String,
    interval: Duration,
    started_at: DateTime<Utc>,
    queue: MentionsQueue,
    polls: AtomicU64,
    last_error: Mutex<Option<String>>,
    stop_tx: watch::Sender<bool>,
}

impl MentionsMonitor {
    /// Spawns a monitor on the current tokio runtime.
    ///
    /// The first poll happens immediately. Intervals shorter than
    /// [`MIN_POLL_INTERVAL`] are raised to it.
    pub fn spawn(client: ClientHandle, account_id: impl Into<String>, interval: Duration) -> Arc<Self> {
        let (stop_tx, stop_rx) = watch::channel(false);
        let monitor = Arc::new(Self {
            account_id: account_id.into(),
            interval: interval.max(MIN_POLL_INTERVAL),
            started_at: Utc::now(),
            queue: MentionsQueue::new(),
            polls: AtomicU64::new(0),
            last_error: Mutex::new(None),
            stop_tx,
        });

        info!(
            account_id = %monitor.account_id,
            interval_ms = u64::try_from(monitor.interval.as_millis()).unwrap_or(u64::MAX),
            "mentions monitor started"
        );
        tokio::spawn(Arc::clone(&monitor).run(client, stop_rx));
        monitor
    }

    async fn run(self: Arc<Self>, client: ClientHandle, mut stop_rx: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut since_id: Option<String> = None;

        loop {
            tokio::select! {
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            let query = MentionsQuery {
                user_id: self.account_id.clone(),
                since_id: since_id.clone(),
            };

            match client.get_users_mentions(&query).await {
                Ok(mut tweets) => {
                    tweets.sort_by_key(Tweet::sort_key);
                    if let Some(newest) = tweets.last() {
                        since_id = Some(newest.id.clone());
                    }
                    debug!(account_id = %self.account_id, count = tweets.len(), "polled mentions");
                    self.queue.push_all(tweets);
                    *self.last_error.lock() = None;
                }
                Err(err) => {
                    warn!(account_id = %self.account_id, error = %err, "mentions poll failed");
                    *self.last_error.lock() = Some(err.to_string());
                }
            }
            self.polls.fetch_add(1, Ordering::SeqCst);
        }

        info!(account_id = %self.account_id, "mentions monitor stopped");
    }

    /// Asks the polling task to stop. Idempotent.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    /// Returns whether the polling task is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.stop_tx.is_closed() && !*self.stop_tx.borrow()
    }

    /// Returns the monitored account.
    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Returns the polling interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns when the monitor was started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns how many polls have completed.
    #[must_use]
    pub fn polls(&self) -> u64 {
        self.polls.load(Ordering::SeqCst)
    }

    /// Returns the error from the latest poll, if it failed.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    /// Returns the collected mentions.
    #[must_use]
    pub const fn queue(&self) -> &MentionsQueue {
        &self.queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryTwitterClient;

    async fn wait_for(monitor: &MentionsMonitor, polls: u64) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while monitor.polls() < polls {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[test]
    fn test_queue_drain() {
        let queue = MentionsQueue::new();
        queue.push_all(vec![Tweet::new("1", "a"), Tweet::new("2", "b")]);
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert_eq!(drained[0].id, "1");
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_monitor_collects_mentions_once() {
        let client = Arc::new(InMemoryTwitterClient::new());
        client.add_mention(Tweet::new("11", "@agent hi").with_author("7"));
        client.add_mention(Tweet::new("10", "@agent first").with_author("7"));

        let monitor = MentionsMonitor::spawn(client.clone(), "42", Duration::from_millis(10));
        wait_for(&monitor, 3).await;

        let drained = monitor.queue().drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].id, "10");
        assert_eq!(drained[1].id, "11");
        assert!(monitor.is_running());

        monitor.stop();
        monitor.stop();
        tokio::time::timeout(Duration::from_secs(5), monitor.stop_tx.closed())
            .await
            .unwrap();
        assert!(!monitor.is_running());
    }

    #[tokio::test]
    async fn test_monitor_records_errors() {
        let client = Arc::new(InMemoryTwitterClient::new());
        client.fail_with(crate::errors::ClientError::Transport("offline".into()));

        let monitor = MentionsMonitor::spawn(client, "42", Duration::from_millis(10));
        wait_for(&monitor, 1).await;

        assert!(monitor.last_error().unwrap().contains("offline"));
        monitor.stop();
    }

    #[tokio::test]
    async fn test_zero_interval_is_raised_to_minimum() {
        let client = Arc::new(InMemoryTwitterClient::new());
        let monitor = MentionsMonitor::spawn(client, "42", Duration::ZERO);
        assert_eq!(monitor.interval(), MIN_POLL_INTERVAL);

        wait_for(&monitor, 2).await;
        assert!(monitor.is_running());

        monitor.stop();
        tokio::time::timeout(Duration::from_secs(5), monitor.stop_tx.closed())
            .await
            .unwrap();
    }
}
