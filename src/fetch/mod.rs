mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::arrivals::FeedSourceId;
use crate::error::{TransportError, TransportResult};

/// Maximum accepted feed body (MTA feeds are typically 50-120 KiB).
pub const MAX_FEED_SIZE: usize = 50 * 1024 * 1024;

/// Retrieves the raw realtime message for one feed source, once.
#[async_trait]
pub trait FeedTransport: Send + Sync {
    async fn fetch(&self, feed: &FeedSourceId) -> TransportResult<Bytes>;
}

#[async_trait]
impl<T: FeedTransport + ?Sized> FeedTransport for std::sync::Arc<T> {
    async fn fetch(&self, feed: &FeedSourceId) -> TransportResult<Bytes> {
        (**self).fetch(feed).await
    }
}

/// GETs `{base_url}?{feed_param}={feed}` through an [`HttpClient`].
pub struct HttpFeedTransport<C> {
    client: C,
    base_url: reqwest::Url,
    feed_param: String,
}

impl<C: HttpClient> HttpFeedTransport<C> {
    pub fn new(client: C, base_url: reqwest::Url, feed_param: impl Into<String>) -> Self {
        Self {
            client,
            base_url,
            feed_param: feed_param.into(),
        }
    }

    /// The URL requested for `feed`, before any auth decoration.
    pub fn feed_url(&self, feed: &FeedSourceId) -> reqwest::Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair(&self.feed_param, feed.as_str());
        url
    }
}

#[async_trait]
impl<C: HttpClient> FeedTransport for HttpFeedTransport<C> {
    #[tracing::instrument(skip_all, fields(feed = %feed))]
    async fn fetch(&self, feed: &FeedSourceId) -> TransportResult<Bytes> {
        fetch_bytes(&self.client, self.feed_url(feed)).await
    }
}

/// Performs a single GET and returns the body of a successful response.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: reqwest::Url) -> TransportResult<Bytes> {
    let req = reqwest::Request::new(reqwest::Method::GET, url);

    let resp = client.execute(req).await?;
    if !resp.status().is_success() {
        return Err(TransportError::Status(resp.status()));
    }

    let bytes = resp.bytes().await?;
    if bytes.len() > MAX_FEED_SIZE {
        return Err(TransportError::TooLarge(bytes.len()));
    }

    debug!(bytes = bytes.len(), "Feed bytes received");
    Ok(bytes)
}
