//! Error types for the fetch pipeline.
//!
//! [`TransportError`] and [`DecodeError`] describe a single failed attempt and
//! are absorbed by the retry loop. [`FetchExhaustedError`] is what escapes once
//! a feed's attempt budget is spent.

use crate::arrivals::FeedSourceId;

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed endpoint returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("feed response too large: {0} bytes")]
    TooLarge(usize),
}

#[derive(thiserror::Error, Debug)]
#[error("malformed feed message: {0}")]
pub struct DecodeError(#[from] pub prost::DecodeError);

/// Failure of one transport → decode attempt.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(thiserror::Error, Debug)]
#[error("feed {feed}: gave up after {attempts} attempts")]
pub struct FetchExhaustedError {
    pub feed: FeedSourceId,
    pub attempts: u32,
    #[source]
    pub source: FetchError,
}

pub type TransportResult<T> = Result<T, TransportError>;
