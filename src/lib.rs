pub mod aggregator;
pub mod arrivals;
pub mod config;
pub mod display;
pub mod error;
pub mod fetch;
pub mod format;
pub mod parser;
pub mod poller;
pub mod retry;
pub mod status;

#[cfg(test)]
mod test_utils;

pub mod gtfs_rt {
    include!(concat!(env!("OUT_DIR"), "/transit_realtime.rs"));
}
