//! Display text for the next arrivals.

use clap::ValueEnum;

use crate::arrivals::Arrival;

/// How many arrivals make it onto the display.
pub const SHOWN_ARRIVALS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DisplayMode {
    /// When to leave to catch each train, accounting for travel time.
    Leave,
    /// When each train arrives.
    Arrival,
}

#[derive(Debug, Clone, Copy)]
pub struct Formatter {
    pub mode: DisplayMode,
    /// Seconds needed to get to the stop.
    pub travel_time: i64,
}

impl Formatter {
    pub fn new(mode: DisplayMode, travel_time: i64) -> Self {
        Self { mode, travel_time }
    }

    /// Renders the first arrivals relative to `now`, or `None` when there are none.
    pub fn format(&self, arrivals: &[Arrival], now: i64) -> Option<String> {
        if arrivals.is_empty() {
            return None;
        }
        let shown = &arrivals[..arrivals.len().min(SHOWN_ARRIVALS)];

        let text = match self.mode {
            DisplayMode::Leave => {
                let parts: Vec<String> = shown
                    .iter()
                    .map(|a| leave_text(a, now, self.travel_time))
                    .collect();
                format!("Leave {}", parts.join(" or "))
            }
            DisplayMode::Arrival => shown
                .iter()
                .map(|a| arrival_text(a, now))
                .collect::<Vec<_>>()
                .join(" then "),
        };
        Some(text)
    }
}

/// Whole minutes in `seconds`, rounded half away from zero.
fn round_minutes(seconds: i64) -> i64 {
    (seconds as f64 / 60.0).round() as i64
}

pub fn leave_text(arrival: &Arrival, now: i64, travel_time: i64) -> String {
    let minutes = round_minutes(arrival.time.saturating_sub(now).saturating_sub(travel_time));
    if minutes < 1 {
        format!("NOW for ({})", arrival.route)
    } else {
        format!("in {}' for ({})", minutes, arrival.route)
    }
}

pub fn arrival_text(arrival: &Arrival, now: i64) -> String {
    format!(
        "({}) in {}'",
        arrival.route,
        round_minutes(arrival.time.saturating_sub(now))
    )
}
