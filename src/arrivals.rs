//! Domain types for stop arrivals and the stop filter.

use serde::Serialize;
use std::fmt;

/// Identifies one realtime feed endpoint (for the MTA, a set of lines).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedSourceId(String);

impl FeedSourceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FeedSourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for FeedSourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for FeedSourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single directional stop, e.g. `R32N`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StopId(String);

impl From<&str> for StopId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for StopId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A decoded trip update that carried route metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripUpdate {
    pub route_name: String,
    pub stop_events: Vec<StopEvent>,
}

/// One per-stop estimate within a [`TripUpdate`].
///
/// Both fields are optional in the feed; an event with no arrival time is
/// never turned into an [`Arrival`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopEvent {
    pub stop_id: Option<StopId>,
    pub arrival_time: Option<i64>,
}

/// An upcoming train at the target stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Arrival {
    /// Unix epoch seconds.
    pub time: i64,
    pub route: String,
}

impl Arrival {
    pub fn new(time: i64, route: impl Into<String>) -> Self {
        Self {
            time,
            route: route.into(),
        }
    }
}

/// Extracts the arrivals at `stop` in feed order.
pub fn filter_stop(trip_updates: &[TripUpdate], stop: &StopId) -> Vec<Arrival> {
    let mut arrivals = Vec::new();

    for trip in trip_updates {
        for event in &trip.stop_events {
            if event.stop_id.as_ref() != Some(stop) {
                continue;
            }
            if let Some(time) = event.arrival_time {
                arrivals.push(Arrival::new(time, trip.route_name.clone()));
            }
        }
    }

    arrivals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(stop: Option<&str>, time: Option<i64>) -> StopEvent {
        StopEvent {
            stop_id: stop.map(StopId::from),
            arrival_time: time,
        }
    }

    fn trip(route: &str, stop_events: Vec<StopEvent>) -> TripUpdate {
        TripUpdate {
            route_name: route.to_string(),
            stop_events,
        }
    }

    #[test]
    fn test_filter_emits_one_arrival_per_matching_event() {
        let trips = vec![
            trip(
                "R",
                vec![
                    event(Some("R31N"), Some(100)),
                    event(Some("R32N"), Some(160)),
                    event(Some("R33N"), Some(220)),
                ],
            ),
            trip("N", vec![event(Some("R32N"), Some(130))]),
        ];

        let arrivals = filter_stop(&trips, &StopId::from("R32N"));

        assert_eq!(
            arrivals,
            vec![Arrival::new(160, "R"), Arrival::new(130, "N")]
        );
    }

    #[test]
    fn test_filter_skips_missing_arrival_time() {
        let trips = vec![trip(
            "D",
            vec![event(Some("R32N"), None), event(Some("R32N"), Some(0))],
        )];

        let arrivals = filter_stop(&trips, &StopId::from("R32N"));

        // absent is skipped, an explicit zero is still a time
        assert_eq!(arrivals, vec![Arrival::new(0, "D")]);
    }

    #[test]
    fn test_filter_skips_missing_stop_id() {
        let trips = vec![trip("F", vec![event(None, Some(500))])];

        assert!(filter_stop(&trips, &StopId::from("R32N")).is_empty());
    }

    #[test]
    fn test_filter_ignores_other_direction() {
        let trips = vec![trip("R", vec![event(Some("R32S"), Some(500))])];

        assert!(filter_stop(&trips, &StopId::from("R32N")).is_empty());
    }

    #[test]
    fn test_filter_keeps_duplicates() {
        let trips = vec![
            trip("R", vec![event(Some("R32N"), Some(300))]),
            trip("R", vec![event(Some("R32N"), Some(300))]),
        ];

        let arrivals = filter_stop(&trips, &StopId::from("R32N"));

        assert_eq!(arrivals.len(), 2);
        assert_eq!(arrivals[0], arrivals[1]);
    }
}
