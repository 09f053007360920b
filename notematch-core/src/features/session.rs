//! Trading-session flag from the UTC hour.

use chrono::{DateTime, Timelike, Utc};

use crate::config::SessionHours;

pub const SESSION_TOKYO: f64 = 0.2;
pub const SESSION_LONDON: f64 = 0.5;
pub const SESSION_NEW_YORK: f64 = 0.8;
/// Used when no timestamp is supplied.
pub const SESSION_UNKNOWN: f64 = 0.5;

/// Map a timestamp to its session bucket value.
pub fn session_flag(timestamp: Option<DateTime<Utc>>, hours: &SessionHours) -> f64 {
    match timestamp {
        Some(ts) => session_for_hour(ts.hour(), hours),
        None => SESSION_UNKNOWN,
    }
}

pub fn session_for_hour(hour: u32, hours: &SessionHours) -> f64 {
    if hour >= hours.london_open && hour < hours.new_york_open {
        SESSION_LONDON
    } else if hour >= hours.new_york_open && hour < hours.new_york_close {
        SESSION_NEW_YORK
    } else {
        SESSION_TOKYO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn hour_buckets() {
        let hours = SessionHours::default();
        assert_eq!(session_for_hour(0, &hours), SESSION_TOKYO);
        assert_eq!(session_for_hour(6, &hours), SESSION_TOKYO);
        assert_eq!(session_for_hour(7, &hours), SESSION_LONDON);
        assert_eq!(session_for_hour(12, &hours), SESSION_LONDON);
        assert_eq!(session_for_hour(13, &hours), SESSION_NEW_YORK);
        assert_eq!(session_for_hour(21, &hours), SESSION_NEW_YORK);
        assert_eq!(session_for_hour(22, &hours), SESSION_TOKYO);
        assert_eq!(session_for_hour(23, &hours), SESSION_TOKYO);
    }

    #[test]
    fn missing_timestamp_is_neutral() {
        assert_eq!(session_flag(None, &SessionHours::default()), 0.5);
    }

    #[test]
    fn uses_utc_hour() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
        assert_eq!(session_flag(Some(ts), &SessionHours::default()), SESSION_NEW_YORK);
    }
}
