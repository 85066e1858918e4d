use std::collections::HashMap;

use super::super::domain::EventType;
use super::super::store::{EventRow, VacancyRow};
use super::super::timestamp::format_minutes;
use super::dated::events_in_period;
use super::period::ReportPeriod;
use super::AnalyticsError;

pub const EXPORT_HEADER: [&str; 5] = ["Date", "Company", "Position", "Activity", "Comment"];

/// Body returned to the caller when the export cannot be produced.
pub const EXPORT_FAILURE_BODY: &str = "Error generating report";

const UNKNOWN: &str = "Unknown";

/// Chronological activity log for the month, one CSV line per event.
///
/// Events are left-joined to their vacancy for company and position; dangling references
/// and blank cells read as `Unknown`.
pub fn csv_export(
    vacancies: &[VacancyRow],
    events: &[EventRow],
    period: &ReportPeriod,
) -> Result<String, AnalyticsError> {
    let mut by_id: HashMap<&str, &VacancyRow> = HashMap::with_capacity(vacancies.len());
    for row in vacancies {
        by_id.entry(row.id.as_str()).or_insert(row);
    }

    let mut period_events = events_in_period(events, period);
    period_events.sort_by_key(|event| event.at);

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;

    for event in &period_events {
        let vacancy = event
            .row
            .vacancy_id
            .as_deref()
            .and_then(|id| by_id.get(id).copied());
        let company = vacancy
            .and_then(|row| row.company.as_deref())
            .unwrap_or(UNKNOWN);
        let position = vacancy
            .and_then(|row| row.position.as_deref())
            .unwrap_or(UNKNOWN);
        let date = format_minutes(event.at);
        let activity = activity_label(event.row);
        let comment = event.row.comment.as_deref().unwrap_or_default();

        writer.write_record([date.as_str(), company, position, activity.as_str(), comment])?;
    }

    let buffer = writer
        .into_inner()
        .map_err(|err| AnalyticsError::Io(err.into_error()))?;
    Ok(String::from_utf8(buffer)?)
}

fn activity_label(row: &EventRow) -> String {
    match row.kind.as_deref() {
        Some(kind) if kind == EventType::StatusChange.as_str() => {
            format!("Status: {}", row.stage_to.as_deref().unwrap_or_default())
        }
        Some(kind) => capitalize(kind),
        None => String::new(),
    }
}

/// Upper-cases the first character and lower-cases the rest.
fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
