use std::collections::HashSet;

use super::super::domain::EventType;
use super::super::store::{EventRow, VacancyRow};
use super::super::timestamp::format_date;
use super::dated::{created_in_period, events_in_period, DatedEvent};
use super::period::ReportPeriod;
use super::views::{HistoryEntry, VacancyMonthlySummary};

const CREATED_STATUS: &str = "Created";
const CREATED_COMMENT: &str = "Vacancy created";

/// Per-vacancy history for every vacancy created or touched during the month.
///
/// Vacancies created in the window come first, then those only seen through events, each
/// in order of first appearance. Events pointing at a vacancy that no longer exists are
/// skipped.
pub fn detailed_summary(
    vacancies: &[VacancyRow],
    events: &[EventRow],
    period: &ReportPeriod,
) -> Vec<VacancyMonthlySummary> {
    let mut period_events = events_in_period(events, period);
    period_events.sort_by_key(|event| event.at);

    let created_ids = vacancies
        .iter()
        .filter(|row| created_in_period(row, period).is_some())
        .map(|row| row.id.as_str());
    let active_ids = period_events
        .iter()
        .filter_map(|event| event.row.vacancy_id.as_deref());

    let mut seen = HashSet::new();
    created_ids
        .chain(active_ids)
        .filter(|id| seen.insert(*id))
        .filter_map(|id| vacancies.iter().find(|row| row.id == id))
        .map(|vacancy| summarize(vacancy, &period_events, period))
        .collect()
}

fn summarize(
    vacancy: &VacancyRow,
    period_events: &[DatedEvent<'_>],
    period: &ReportPeriod,
) -> VacancyMonthlySummary {
    let created = created_in_period(vacancy, period).map(|at| HistoryEntry {
        date: format_date(at),
        status: Some(CREATED_STATUS.to_string()),
        comment: Some(CREATED_COMMENT.to_string()),
    });

    let logged = period_events
        .iter()
        .filter(|event| event.row.belongs_to(&vacancy.id))
        .map(history_entry);

    VacancyMonthlySummary {
        company: vacancy.company.clone(),
        position: vacancy.position.clone(),
        current_stage: vacancy.stage.clone(),
        history: created.into_iter().chain(logged).collect(),
    }
}

fn history_entry(event: &DatedEvent<'_>) -> HistoryEntry {
    let row = event.row;
    let status = match row.kind.as_deref() {
        Some(kind) if kind == EventType::StatusChange.as_str() => row.stage_to.clone(),
        other => other.map(str::to_string),
    };
    HistoryEntry {
        date: format_date(event.at),
        status,
        comment: row.comment.clone(),
    }
}
