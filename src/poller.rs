//! The fetch → format → publish cycle and the loop that repeats it.

use chrono::Utc;
use std::time::Duration;
use tracing::{error, info};

use crate::aggregator::ArrivalAggregator;
use crate::fetch::FeedTransport;
use crate::format::Formatter;
use crate::retry::Sleeper;
use crate::status::{Status, StatusSink};

/// Runs one aggregation cycle and publishes its outcome.
///
/// A failed fetch is reported, not returned: the next cycle starts from scratch.
pub async fn poll_once<T: FeedTransport, S: Sleeper>(
    aggregator: &ArrivalAggregator<T, S>,
    formatter: &Formatter,
    sink: &dyn StatusSink,
) -> Status {
    let status = match aggregator.fetch_station_trains(true).await {
        Ok(arrivals) => match formatter.format(&arrivals, Utc::now().timestamp()) {
            Some(text) => Status::Trains(text),
            None => Status::NoTrains,
        },
        Err(e) => {
            error!(error = %e, "Polling cycle failed");
            Status::Unavailable
        }
    };

    sink.publish(status.clone());
    status
}

/// Polls forever, sleeping `refresh` between cycles.
pub async fn run<T: FeedTransport, S: Sleeper>(
    aggregator: ArrivalAggregator<T, S>,
    formatter: Formatter,
    sink: &dyn StatusSink,
    refresh: Duration,
) {
    info!(
        stop = %aggregator.stop(),
        refresh_secs = refresh.as_secs(),
        "Polling started"
    );

    loop {
        poll_once(&aggregator, &formatter, sink).await;
        tokio::time::sleep(refresh).await;
    }
}
