//! Protobuf parser for GTFS Realtime feeds.

use prost::Message;
use tracing::debug;

use crate::arrivals::{StopEvent, StopId, TripUpdate};
use crate::error::DecodeError;
use crate::gtfs_rt::FeedMessage;

/// Decodes a protobuf-encoded GTFS-RT [`FeedMessage`] from raw bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid protobuf for a `FeedMessage`.
pub fn parse_feed(bytes: &[u8]) -> Result<FeedMessage, DecodeError> {
    Ok(FeedMessage::decode(bytes)?)
}

/// Decodes raw feed bytes straight into [`TripUpdate`]s.
pub fn decode_trip_updates(bytes: &[u8]) -> Result<Vec<TripUpdate>, DecodeError> {
    let feed = parse_feed(bytes)?;
    Ok(trip_updates(&feed))
}

/// Converts the usable trip updates of a feed.
///
/// Entities without a trip update, without stop time updates, or without a
/// route id are skipped.
pub fn trip_updates(feed: &FeedMessage) -> Vec<TripUpdate> {
    let mut skipped = 0usize;

    let updates: Vec<TripUpdate> = feed
        .entity
        .iter()
        .filter_map(|entity| {
            let update = entity.trip_update.as_ref();
            let converted = update.and_then(|tu| {
                if tu.stop_time_update.is_empty() {
                    return None;
                }
                let route_name = tu.trip.route_id.clone()?;

                let stop_events = tu
                    .stop_time_update
                    .iter()
                    .map(|stu| StopEvent {
                        stop_id: stu.stop_id.clone().map(StopId::from),
                        arrival_time: stu.arrival.as_ref().and_then(|a| a.time),
                    })
                    .collect();

                Some(TripUpdate {
                    route_name,
                    stop_events,
                })
            });

            if converted.is_none() {
                skipped += 1;
            }
            converted
        })
        .collect();

    debug!(
        entities = feed.entity.len(),
        trip_updates = updates.len(),
        skipped,
        "Feed converted"
    );

    updates
}
