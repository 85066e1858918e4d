use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};

use super::AnalyticsError;

/// A calendar month as the half-open window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    year: i32,
    month: u32,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl ReportPeriod {
    const MIN_YEAR: i32 = 1;
    const MAX_YEAR: i32 = 9999;

    pub fn resolve(year: i32, month: i32) -> Result<Self, AnalyticsError> {
        let invalid = || AnalyticsError::InvalidPeriod { year, month };

        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return Err(invalid());
        }
        let month = u32::try_from(month).map_err(|_| invalid())?;
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };

        let start = first_instant(year, month).ok_or_else(invalid)?;
        let end = first_instant(next_year, next_month).ok_or_else(invalid)?;

        Ok(Self {
            year,
            month,
            start,
            end,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end
    }

    pub fn label(&self) -> String {
        period_label(self.year, self.month as i32)
    }
}

/// `YYYY-MM` label; also used for the default report of an unresolvable period.
pub fn period_label(year: i32, month: i32) -> String {
    format!("{year}-{month:02}")
}

/// The requested `(year, month)`, or the current local month when either part is missing or zero.
pub fn requested_or_current(year: Option<i32>, month: Option<i32>) -> (i32, i32) {
    match (year, month) {
        (Some(year), Some(month)) if year != 0 && month != 0 => (year, month),
        _ => {
            let today = Local::now().date_naive();
            (today.year(), today.month() as i32)
        }
    }
}

fn first_instant(year: i32, month: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, 1).and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("valid instant")
    }

    #[test]
    fn every_month_spans_28_to_31_days() {
        for year in [2023, 2024, 2100] {
            for month in 1..=12 {
                let period = ReportPeriod::resolve(year, month).expect("valid month");
                assert!(period.start() < period.end());
                assert_eq!(period.end().date().day(), 1);
                let days = (period.end() - period.start()).num_days();
                assert!((28..=31).contains(&days), "{year}-{month} spans {days} days");
            }
        }
    }

    #[test]
    fn december_rolls_into_next_year() {
        let period = ReportPeriod::resolve(2024, 12).expect("valid month");
        assert_eq!(period.start(), midnight(2024, 12, 1));
        assert_eq!(period.end(), midnight(2025, 1, 1));
        assert_eq!(period.label(), "2024-12");
    }

    #[test]
    fn window_is_half_open() {
        let period = ReportPeriod::resolve(2024, 2).expect("valid month");
        assert!(period.contains(midnight(2024, 2, 1)));
        assert!(period.contains(midnight(2024, 2, 29)));
        assert!(!period.contains(midnight(2024, 3, 1)));
        assert!(!period.contains(midnight(2024, 1, 31)));
    }

    #[test]
    fn rejects_impossible_months() {
        for (year, month) in [(2024, 0), (2024, 13), (2024, -1), (0, 5), (10_000, 1)] {
            match ReportPeriod::resolve(year, month) {
                Err(AnalyticsError::InvalidPeriod { year: y, month: m }) => {
                    assert_eq!((y, m), (year, month));
                }
                other => panic!("expected invalid period for {year}-{month}, got {other:?}"),
            }
        }
        assert_eq!(period_label(2024, 13), "2024-13");
    }

    #[test]
    fn missing_or_zero_parts_select_current_month() {
        let today = Local::now().date_naive();
        let current = (today.year(), today.month() as i32);

        assert_eq!(requested_or_current(None, None), current);
        assert_eq!(requested_or_current(Some(2024), None), current);
        assert_eq!(requested_or_current(Some(2024), Some(0)), current);
        assert_eq!(requested_or_current(Some(0), Some(5)), current);
        assert_eq!(requested_or_current(Some(2023), Some(11)), (2023, 11));
        assert_eq!(requested_or_current(Some(2024), Some(13)), (2024, 13));
    }
}
