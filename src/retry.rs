//! Bounded retry around the transport → decode → filter pipeline.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::arrivals::{Arrival, FeedSourceId, StopId, filter_stop};
use crate::error::{FetchError, FetchExhaustedError};
use crate::fetch::FeedTransport;
use crate::parser::decode_trip_updates;
use crate::status::{Status, StatusSink};

/// Abstracts waiting so retry timing can be observed in tests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
    pub terminal_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            backoff: Duration::from_secs(30),
            terminal_delay: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry(Duration),
    GiveUp(Duration),
}

impl RetryPolicy {
    /// Attempts actually made per feed: one fewer than `max_attempts`.
    ///
    /// Floored at one so a fetcher built directly with `max_attempts` of 0 or 1
    /// still tries the feed once. `FeedArgs::validate` rejects those values, so
    /// the floor only applies to library callers.
    pub fn attempt_budget(&self) -> u32 {
        self.max_attempts.saturating_sub(1).max(1)
    }

    /// What to do after the 1-based `attempt` failed.
    pub fn after_failure(&self, attempt: u32) -> RetryDecision {
        if attempt < self.attempt_budget() {
            RetryDecision::Retry(self.backoff)
        } else {
            RetryDecision::GiveUp(self.terminal_delay)
        }
    }
}

/// Fetches the arrivals of one feed source, retrying transient failures.
pub struct RetryingFetcher<T, S> {
    transport: T,
    sleeper: S,
    policy: RetryPolicy,
    status: Arc<dyn StatusSink>,
}

impl<T: FeedTransport, S: Sleeper> RetryingFetcher<T, S> {
    pub fn new(transport: T, sleeper: S, policy: RetryPolicy, status: Arc<dyn StatusSink>) -> Self {
        Self {
            transport,
            sleeper,
            policy,
            status,
        }
    }

    #[tracing::instrument(skip_all, fields(feed = %feed, stop = %stop))]
    pub async fn fetch_one(
        &self,
        feed: &FeedSourceId,
        stop: &StopId,
    ) -> Result<Vec<Arrival>, FetchExhaustedError> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let err = match self.attempt(feed, stop).await {
                Ok(arrivals) => {
                    debug!(attempt, arrivals = arrivals.len(), "Feed fetched");
                    return Ok(arrivals);
                }
                Err(e) => e,
            };

            match self.policy.after_failure(attempt) {
                RetryDecision::Retry(delay) => {
                    warn!(error = %err, attempt, delay_secs = delay.as_secs(), "Feed fetch failed, retrying");
                    self.status.publish(Status::Retrying {
                        delay,
                        attempt,
                        max_attempts: self.policy.max_attempts,
                    });
                    self.sleeper.sleep(delay).await;
                }
                RetryDecision::GiveUp(delay) => {
                    error!(error = %err, attempts = attempt, "Feed fetch failed, giving up");
                    self.status.publish(Status::Exhausted);
                    self.sleeper.sleep(delay).await;
                    return Err(FetchExhaustedError {
                        feed: feed.clone(),
                        attempts: attempt,
                        source: err,
                    });
                }
            }
        }
    }

    async fn attempt(&self, feed: &FeedSourceId, stop: &StopId) -> Result<Vec<Arrival>, FetchError> {
        let bytes = self.transport.fetch(feed).await?;
        let trips = decode_trip_updates(&bytes)?;
        Ok(filter_stop(&trips, stop))
    }
}
