//! Lenient timestamp handling shared by the record store and the analytics engine.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SubsecRound};

const STORAGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Local wall-clock time at the precision the store keeps.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(6)
}

/// Parses the formats the store has historically written; `None` for blank or foreign input.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// ISO-8601 with microsecond precision.
pub fn format_iso_micros(value: NaiveDateTime) -> String {
    value.format(STORAGE_FORMAT).to_string()
}

pub fn format_date(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%d").to_string()
}

pub fn format_minutes(value: NaiveDateTime) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .expect("valid date")
            .and_hms_opt(h, min, s)
            .expect("valid time")
    }

    #[test]
    fn parses_iso_variants_and_bare_dates() {
        assert_eq!(
            parse_timestamp("2024-05-03T10:15:00.123456"),
            NaiveDate::from_ymd_opt(2024, 5, 3)
                .and_then(|d| d.and_hms_micro_opt(10, 15, 0, 123_456))
        );
        assert_eq!(
            parse_timestamp("2024-05-03T10:15:00Z"),
            Some(at(2024, 5, 3, 10, 15, 0))
        );
        assert_eq!(
            parse_timestamp("2024-05-03 10:15:30"),
            Some(at(2024, 5, 3, 10, 15, 30))
        );
        assert_eq!(
            parse_timestamp("2024-05-03 10:15"),
            Some(at(2024, 5, 3, 10, 15, 0))
        );
        assert_eq!(parse_timestamp(" 2024-05-02 "), Some(at(2024, 5, 2, 0, 0, 0)));
    }

    #[test]
    fn rejects_blank_and_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("   ").is_none());
        assert!(parse_timestamp("nan").is_none());
        assert!(parse_timestamp("2024-13-01").is_none());
    }

    #[test]
    fn formats_for_storage_and_reports() {
        let value = at(2024, 5, 3, 9, 5, 7);
        assert_eq!(format_iso_micros(value), "2024-05-03T09:05:07.000000");
        assert_eq!(format_date(value), "2024-05-03");
        assert_eq!(format_minutes(value), "2024-05-03 09:05");
        assert_eq!(parse_timestamp(&format_iso_micros(value)), Some(value));
    }

    #[test]
    fn current_time_survives_storage() {
        let value = now();
        assert_eq!(parse_timestamp(&format_iso_micros(value)), Some(value));
    }
}
