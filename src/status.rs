//! Status lines shown while data is being fetched.

use std::fmt;
use std::time::Duration;
use tracing::{Level, debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Starting,
    Retrying {
        delay: Duration,
        attempt: u32,
        max_attempts: u32,
    },
    Exhausted,
    /// A polling cycle failed after a feed gave up.
    Unavailable,
    NoTrains,
    Trains(String),
}

impl Status {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Status::Retrying { .. } | Status::Exhausted | Status::Unavailable
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Starting => f.write_str("Getting train data..."),
            Status::Retrying {
                delay,
                attempt,
                max_attempts,
            } => write!(
                f,
                "ERROR getting data. Delaying for {}s. Attempt {} of {}.",
                delay.as_secs(),
                attempt,
                max_attempts
            ),
            Status::Exhausted => f.write_str("ERROR getting data. Max # of retries attempted."),
            Status::Unavailable => f.write_str("Cannot get train data."),
            Status::NoTrains => f.write_str("No upcoming trains."),
            Status::Trains(text) => f.write_str(text),
        }
    }
}

/// Receives status notifications. Delivery is fire-and-forget.
pub trait StatusSink: Send + Sync {
    fn publish(&self, status: Status);
}

/// Writes status lines to the log only.
///
/// Error lines go out at debug: the retry loop and the poller already log
/// each failure with its cause.
pub struct LogSink;

impl LogSink {
    pub fn level(status: &Status) -> Level {
        if status.is_error() {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }
}

impl StatusSink for LogSink {
    fn publish(&self, status: Status) {
        if Self::level(&status) == Level::DEBUG {
            debug!(%status, "Status");
        } else {
            info!(%status, "Status");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_line() {
        let status = Status::Retrying {
            delay: Duration::from_secs(30),
            attempt: 3,
            max_attempts: 30,
        };
        assert_eq!(
            status.to_string(),
            "ERROR getting data. Delaying for 30s. Attempt 3 of 30."
        );
        assert!(status.is_error());
    }

    #[test]
    fn test_no_trains_differs_from_unavailable() {
        assert_ne!(Status::NoTrains.to_string(), Status::Unavailable.to_string());
        assert!(!Status::NoTrains.is_error());
    }

    #[test]
    fn test_failures_are_not_logged_twice_at_warn() {
        assert_eq!(LogSink::level(&Status::Exhausted), Level::DEBUG);
        assert_eq!(LogSink::level(&Status::Unavailable), Level::DEBUG);
        assert_eq!(LogSink::level(&Status::NoTrains), Level::INFO);
        assert_eq!(
            LogSink::level(&Status::Trains("(R) in 2'".to_string())),
            Level::INFO
        );
    }
}
