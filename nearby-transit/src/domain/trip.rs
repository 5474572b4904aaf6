//! Departure (trip) types.

use chrono::{DateTime, Utc};

use super::transit_type::TransitType;

/// Line descriptor of a departure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub name: String,
    pub product: TransitType,
}

/// A single departure from a station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    /// De-duplication key within one station's departure list.
    ///
    /// Not globally unique: synthesised from planned time and line name when
    /// the API omits it.
    pub trip_id: String,
    pub line: Line,
    pub direction: String,
    /// Actual/estimated departure time.
    pub when: DateTime<Utc>,
    /// Scheduled departure time.
    pub planned_when: DateTime<Utc>,
    /// `when - planned_when` rounded to whole minutes. May be negative.
    pub delay: i64,
    pub cancelled: bool,
    /// Empty if the API gave no platform.
    pub platform: String,
}

impl Trip {
    /// Delay in minutes between two times. Exact halves round up, so
    /// -2.5 minutes is -2.
    pub fn delay_minutes(planned: DateTime<Utc>, actual: DateTime<Utc>) -> i64 {
        let millis = (actual - planned).num_milliseconds();
        (millis as f64 / 60_000.0 + 0.5).floor() as i64
    }

    pub fn is_delayed(&self) -> bool {
        self.delay > 0
    }
}
