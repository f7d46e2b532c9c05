//! Process configuration: command-line flags with environment fallbacks.
//!
//! Values can also come from a `.env` file, which the binary loads before
//! parsing.

use anyhow::{Context, Result, bail};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::aggregator::ArrivalAggregator;
use crate::arrivals::{FeedSourceId, StopId};
use crate::fetch::auth::{ApiKey, UrlParam};
use crate::fetch::{BasicClient, FeedTransport, HttpFeedTransport};
use crate::format::{DisplayMode, Formatter};
use crate::retry::{RetryPolicy, RetryingFetcher, TokioSleeper};
use crate::status::StatusSink;

pub const DEFAULT_BASE_URL: &str = "http://datamine.mta.info/mta_esi.php";

/// Feeds regenerate about every 30s; polling faster than this wastes bandwidth.
pub const MIN_REFRESH_SECS: u64 = 60;

#[derive(Args, Debug, Clone)]
pub struct FeedArgs {
    /// API key for the realtime feed endpoint
    #[arg(long, env = "MTA_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Send the API key in this HTTP header instead of a query parameter
    #[arg(long, env = "MTA_API_KEY_HEADER")]
    pub api_key_header: Option<String>,

    /// Query parameter carrying the API key
    #[arg(long, default_value = "key")]
    pub api_key_param: String,

    /// Realtime feed endpoint
    #[arg(long, env = "MTA_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Query parameter selecting the feed
    #[arg(long, default_value = "feed_id")]
    pub feed_param: String,

    /// Stop to watch, including direction (e.g. "R32N")
    #[arg(long, env = "MTA_STOP_ID")]
    pub stop_id: String,

    /// Feeds covering the lines that serve the stop
    #[arg(long, env = "MTA_FEED_IDS", value_delimiter = ',', required = true)]
    pub feed_ids: Vec<String>,

    /// Maximum fetch attempts per feed before giving up
    #[arg(long, env = "MTA_MAX_ATTEMPTS", default_value_t = 30)]
    pub max_attempts: u32,

    /// Delay between failed attempts, in seconds
    #[arg(long, default_value_t = 30)]
    pub backoff: u64,

    /// Delay after the last failed attempt, in seconds
    #[arg(long, default_value_t = 10)]
    pub terminal_delay: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Seconds it takes to walk to the stop
    #[arg(long, env = "TRAVEL_TIME", default_value_t = 170)]
    pub travel_time: i64,

    /// Seconds between polling cycles
    #[arg(long, env = "REFRESH_DELAY", default_value_t = 65)]
    pub refresh_delay: u64,

    /// What the display shows
    #[arg(long, env = "DISPLAY_MODE", value_enum, default_value_t = DisplayMode::Leave)]
    pub mode: DisplayMode,
}

impl FeedArgs {
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts < 2 {
            bail!(
                "max attempts must be at least 2 (got {}); one attempt is always held back",
                self.max_attempts
            );
        }
        if self.feed_ids.iter().any(|f| f.trim().is_empty()) {
            bail!("feed ids must not be empty");
        }
        if self.stop_id.trim().is_empty() {
            bail!("stop id must not be empty");
        }
        if self.refresh_delay < MIN_REFRESH_SECS {
            warn!(
                refresh_delay = self.refresh_delay,
                minimum = MIN_REFRESH_SECS,
                "Refresh delay is shorter than the feed regeneration interval"
            );
        }
        Ok(())
    }

    pub fn stop(&self) -> StopId {
        StopId::from(self.stop_id.trim())
    }

    pub fn feeds(&self) -> Vec<FeedSourceId> {
        self.feed_ids
            .iter()
            .map(|f| FeedSourceId::from(f.trim()))
            .collect()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: Duration::from_secs(self.backoff),
            terminal_delay: Duration::from_secs(self.terminal_delay),
        }
    }

    pub fn refresh(&self) -> Duration {
        Duration::from_secs(self.refresh_delay)
    }

    pub fn formatter(&self) -> Formatter {
        Formatter::new(self.mode, self.travel_time)
    }

    /// Builds the HTTP transport, attaching the API key the configured way.
    pub fn transport(&self) -> Result<Arc<dyn FeedTransport>> {
        let api_key = self
            .api_key
            .as_deref()
            .context("an API key is required (--api-key or MTA_API_KEY)")?;
        let base_url: reqwest::Url = self
            .base_url
            .parse()
            .with_context(|| format!("invalid base URL '{}'", self.base_url))?;
        let client = BasicClient::with_timeout(Duration::from_secs(self.timeout))?;

        let transport: Arc<dyn FeedTransport> = match &self.api_key_header {
            Some(header) => Arc::new(HttpFeedTransport::new(
                ApiKey::new(client, header, api_key)?,
                base_url,
                self.feed_param.as_str(),
            )),
            None => Arc::new(HttpFeedTransport::new(
                UrlParam {
                    inner: client,
                    param_name: self.api_key_param.clone(),
                    key: api_key.to_string(),
                },
                base_url,
                self.feed_param.as_str(),
            )),
        };
        Ok(transport)
    }

    /// Wires transport, retry policy and status sink into an aggregator.
    pub fn aggregator(
        &self,
        status: Arc<dyn StatusSink>,
    ) -> Result<ArrivalAggregator<Arc<dyn FeedTransport>, TokioSleeper>> {
        self.validate()?;
        let fetcher = RetryingFetcher::new(self.transport()?, TokioSleeper, self.retry_policy(), status);
        Ok(ArrivalAggregator::new(fetcher, self.stop(), self.feeds()))
    }
}
