//! Time helpers for RateHub.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// A timestamp with timezone (always UTC for RateHub).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// First instant of a calendar day, UTC.
pub fn start_of_day(date: NaiveDate) -> Timestamp {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Last whole second of a calendar day, UTC. Used to turn a date query
/// parameter into an inclusive cutoff.
pub fn end_of_day(date: NaiveDate) -> Timestamp {
    let end = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    date.and_time(end).and_utc()
}
