//! Merges the arrivals of every configured feed into one sorted list.

use chrono::Utc;
use futures::future::try_join_all;
use tracing::info;

use crate::arrivals::{Arrival, FeedSourceId, StopId};
use crate::error::FetchExhaustedError;
use crate::fetch::FeedTransport;
use crate::retry::{RetryingFetcher, Sleeper};

pub struct ArrivalAggregator<T, S> {
    fetcher: RetryingFetcher<T, S>,
    stop: StopId,
    feeds: Vec<FeedSourceId>,
}

impl<T: FeedTransport, S: Sleeper> ArrivalAggregator<T, S> {
    pub fn new(fetcher: RetryingFetcher<T, S>, stop: StopId, feeds: Vec<FeedSourceId>) -> Self {
        Self {
            fetcher,
            stop,
            feeds,
        }
    }

    pub fn stop(&self) -> &StopId {
        &self.stop
    }

    /// Fetches every feed and returns the stop's arrivals sorted by time.
    ///
    /// With `exclude_past`, arrivals at or before the current second are
    /// dropped. An empty list means no trains; an error means a feed could not
    /// be read at all.
    #[tracing::instrument(skip_all, fields(exclude_past = exclude_past, stop = %self.stop, feeds = self.feeds.len()))]
    pub async fn fetch_station_trains(
        &self,
        exclude_past: bool,
    ) -> Result<Vec<Arrival>, FetchExhaustedError> {
        let batches = try_join_all(
            self.feeds
                .iter()
                .map(|feed| self.fetcher.fetch_one(feed, &self.stop)),
        )
        .await?;

        let mut arrivals = merge_arrivals(batches);
        let fetched = arrivals.len();

        if exclude_past {
            retain_upcoming(&mut arrivals, Utc::now().timestamp());
        }

        info!(fetched, upcoming = arrivals.len(), "Arrivals aggregated");
        Ok(arrivals)
    }
}

/// Concatenates per-feed batches and stable-sorts them by arrival time.
pub fn merge_arrivals(batches: Vec<Vec<Arrival>>) -> Vec<Arrival> {
    let mut arrivals: Vec<Arrival> = batches.into_iter().flatten().collect();
    arrivals.sort_by_key(|a| a.time);
    arrivals
}

/// Keeps only arrivals strictly after `now`.
pub fn retain_upcoming(arrivals: &mut Vec<Arrival>, now: i64) {
    arrivals.retain(|a| a.time > now);
}
