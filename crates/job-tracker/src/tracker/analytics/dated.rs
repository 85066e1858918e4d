use chrono::NaiveDateTime;

use super::super::store::{EventRow, VacancyRow};
use super::super::timestamp::parse_timestamp;
use super::period::ReportPeriod;

/// An event row whose timestamp parsed.
#[derive(Debug, Clone, Copy)]
pub(super) struct DatedEvent<'a> {
    pub(super) row: &'a EventRow,
    pub(super) at: NaiveDateTime,
}

/// Events inside the window, in store order. Rows with unparsable timestamps are dropped.
pub(super) fn events_in_period<'a>(
    events: &'a [EventRow],
    period: &ReportPeriod,
) -> Vec<DatedEvent<'a>> {
    events
        .iter()
        .filter_map(|row| {
            let at = row.timestamp.as_deref().and_then(parse_timestamp)?;
            period.contains(at).then_some(DatedEvent { row, at })
        })
        .collect()
}

/// Creation instant of the vacancy when it falls inside the window.
pub(super) fn created_in_period(row: &VacancyRow, period: &ReportPeriod) -> Option<NaiveDateTime> {
    row.created_at
        .as_deref()
        .and_then(parse_timestamp)
        .filter(|at| period.contains(*at))
}
