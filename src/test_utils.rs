//! Fakes shared by the unit tests.

use async_trait::async_trait;
use bytes::Bytes;
use prost::Message;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::arrivals::FeedSourceId;
use crate::error::{TransportError, TransportResult};
use crate::fetch::{FeedTransport, HttpClient};
use crate::gtfs_rt::trip_update::{StopTimeEvent, StopTimeUpdate};
use crate::gtfs_rt::{FeedEntity, FeedHeader, FeedMessage, TripDescriptor, TripUpdate};
use crate::retry::Sleeper;
use crate::status::{Status, StatusSink};

/// Encodes a feed with one trip per `(route, time)`, each stopping at `stop_id`.
pub fn feed_bytes(stop_id: &str, trips: &[(&str, i64)]) -> Bytes {
    let entity = trips
        .iter()
        .enumerate()
        .map(|(i, (route, time))| FeedEntity {
            id: i.to_string(),
            trip_update: Some(TripUpdate {
                trip: TripDescriptor {
                    route_id: Some(route.to_string()),
                    ..Default::default()
                },
                stop_time_update: vec![StopTimeUpdate {
                    stop_id: Some(stop_id.to_string()),
                    arrival: Some(StopTimeEvent {
                        time: Some(*time),
                        ..Default::default()
                    }),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            ..Default::default()
        })
        .collect();

    let feed = FeedMessage {
        header: FeedHeader {
            gtfs_realtime_version: "2.0".to_string(),
            ..Default::default()
        },
        entity,
    };
    Bytes::from(feed.encode_to_vec())
}

pub fn unavailable() -> TransportError {
    TransportError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE)
}

/// Replays queued responses per feed; a feed with nothing queued fails.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<FeedSourceId, VecDeque<TransportResult<Bytes>>>>,
    calls: AtomicU32,
}

impl ScriptedTransport {
    pub fn push(&self, feed: &str, response: TransportResult<Bytes>) {
        self.responses
            .lock()
            .unwrap()
            .entry(FeedSourceId::from(feed))
            .or_default()
            .push_back(response);
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedTransport for ScriptedTransport {
    async fn fetch(&self, feed: &FeedSourceId) -> TransportResult<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .get_mut(feed)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(unavailable()))
    }
}

/// Records requested delays without waiting.
#[derive(Clone, Default)]
pub struct RecordingSleeper(pub Arc<Mutex<Vec<Duration>>>);

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.0.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.0.lock().unwrap().push(duration);
    }
}

/// Collects everything published, for assertions.
#[derive(Clone, Default)]
pub struct RecordingSink(pub Arc<Mutex<Vec<Status>>>);

impl RecordingSink {
    pub fn statuses(&self) -> Vec<Status> {
        self.0.lock().unwrap().clone()
    }
}

impl StatusSink for RecordingSink {
    fn publish(&self, status: Status) {
        self.0.lock().unwrap().push(status);
    }
}

/// Answers every request with the same status and body, remembering what was sent.
#[derive(Clone)]
pub struct CannedClient {
    status: u16,
    body: Vec<u8>,
    pub sent: Arc<Mutex<Vec<(reqwest::Url, reqwest::header::HeaderMap)>>>,
}

impl CannedClient {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            body,
            sent: Arc::default(),
        }
    }

    pub fn last_sent(&self) -> (reqwest::Url, reqwest::header::HeaderMap) {
        self.sent.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl HttpClient for CannedClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.sent
            .lock()
            .unwrap()
            .push((req.url().clone(), req.headers().clone()));
        let resp = http::Response::builder()
            .status(self.status)
            .body(self.body.clone())
            .unwrap();
        Ok(reqwest::Response::from(resp))
    }
}
