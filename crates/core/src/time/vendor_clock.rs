use chrono::{DateTime, Utc};

// The provider counts minutes from 2011-01-01T00:00:00Z.
pub const VENDOR_MINUTES_OFFSET: i64 = 21_564_000;

/// Reserved "no data" marker used throughout provider arrays.
pub const NULL_SENTINEL: i64 = -1;

pub fn to_calendar_time(vendor_minutes: i64) -> Option<DateTime<Utc>> {
    if vendor_minutes == NULL_SENTINEL {
        return None;
    }

    let unix_seconds = vendor_minutes
        .checked_add(VENDOR_MINUTES_OFFSET)?
        .checked_mul(60)?;
    DateTime::from_timestamp(unix_seconds, 0)
}

pub fn to_vendor_minutes(at: DateTime<Utc>) -> i64 {
    at.timestamp().div_euclid(60) - VENDOR_MINUTES_OFFSET
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn sentinel_is_none_not_epoch() {
        assert_eq!(to_calendar_time(NULL_SENTINEL), None);
    }

    #[test]
    fn zero_is_provider_epoch() {
        let t = to_calendar_time(0).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2011, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn round_trip_stays_within_a_minute() {
        for m in [0_i64, 1, 59, 1_000, 3_456_789, 7_000_000, 7_654_321, 12_000_000] {
            let t = to_calendar_time(m).unwrap();
            let back = to_vendor_minutes(t);
            assert!((back - m).abs() * 60 < 60, "m={m} back={back}");
        }

        let at = Utc.with_ymd_and_hms(2026, 10, 19, 13, 37, 42).unwrap();
        let back = to_calendar_time(to_vendor_minutes(at)).unwrap();
        assert!((at - back).num_seconds().abs() < 60);
    }

    #[test]
    fn realistic_inputs_are_not_absurdly_old() {
        // Values seen in live payloads sit in the 6-8 million range.
        for m in [6_000_000_i64, 7_200_000, 8_100_000] {
            let year = to_calendar_time(m).unwrap().year();
            assert!((2020..2030).contains(&year), "m={m} year={year}");
        }
        assert!(to_calendar_time(1).unwrap().year() >= 2011);
    }

    #[test]
    fn overflow_degrades_to_none() {
        assert_eq!(to_calendar_time(i64::MAX), None);
    }
}
