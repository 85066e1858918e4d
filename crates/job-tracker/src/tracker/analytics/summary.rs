use super::super::domain::EventType;
use super::super::store::{EventRow, VacancyRow};
use super::dated::{created_in_period, events_in_period};
use super::period::ReportPeriod;
use super::views::{ActivityRecord, MonthlyReport, ReportMetrics};

pub const RECENT_ACTIVITY_LIMIT: usize = 10;

/// Scalar counts for the month plus its last [`RECENT_ACTIVITY_LIMIT`] events.
///
/// Stage counters only look at `status_change` events. `recent_activity` is ordered
/// oldest first after a stable sort by timestamp, so ties keep store order.
pub fn monthly_report(
    vacancies: &[VacancyRow],
    events: &[EventRow],
    period: &ReportPeriod,
) -> MonthlyReport {
    let mut metrics = ReportMetrics {
        new_vacancies_count: vacancies
            .iter()
            .filter(|row| created_in_period(row, period).is_some())
            .count(),
        ..ReportMetrics::default()
    };

    let mut period_events = events_in_period(events, period);
    metrics.activities_count = period_events.len();

    let transitions = period_events
        .iter()
        .filter(|event| event.row.kind.as_deref() == Some(EventType::StatusChange.as_str()))
        .filter_map(|event| event.row.stage_to.as_deref());
    for stage_to in transitions {
        if let Some(counter) = metrics.transition_counter(stage_to) {
            *counter += 1;
        }
    }

    period_events.sort_by_key(|event| event.at);
    let skip = period_events.len().saturating_sub(RECENT_ACTIVITY_LIMIT);
    let recent_activity = period_events[skip..]
        .iter()
        .map(ActivityRecord::from_dated)
        .collect();

    MonthlyReport {
        period: period.label(),
        metrics,
        recent_activity,
    }
}
