use serde::{Deserialize, Serialize};

use super::super::domain::Stage;
use super::super::timestamp::format_iso_micros;
use super::dated::DatedEvent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetrics {
    pub new_vacancies_count: usize,
    pub activities_count: usize,
    pub applications_sent: usize,
    pub interviews: usize,
    pub offers: usize,
    pub rejected: usize,
    pub closed: usize,
}

impl ReportMetrics {
    /// Counter tracking transitions into `stage_to`, matched exactly. Other stages have none.
    pub(super) fn transition_counter(&mut self, stage_to: &str) -> Option<&mut usize> {
        let stage = Stage::ordered()
            .into_iter()
            .find(|stage| stage.as_str() == stage_to)?;
        match stage {
            Stage::Applied => Some(&mut self.applications_sent),
            Stage::Interview => Some(&mut self.interviews),
            Stage::Offer => Some(&mut self.offers),
            Stage::Rejected => Some(&mut self.rejected),
            Stage::Closed => Some(&mut self.closed),
            Stage::New | Stage::Response => None,
        }
    }
}

/// Raw event as listed under `recent_activity`; absent cells serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: String,
    pub vacancy_id: Option<String>,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub stage_from: Option<String>,
    pub stage_to: Option<String>,
    pub comment: Option<String>,
}

impl ActivityRecord {
    pub(super) fn from_dated(event: &DatedEvent<'_>) -> Self {
        let row = event.row;
        Self {
            id: row.id.clone(),
            vacancy_id: row.vacancy_id.clone(),
            timestamp: format_iso_micros(event.at),
            kind: row.kind.clone(),
            stage_from: row.stage_from.clone(),
            stage_to: row.stage_to.clone(),
            comment: row.comment.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub period: String,
    pub metrics: ReportMetrics,
    pub recent_activity: Vec<ActivityRecord>,
}

impl MonthlyReport {
    /// Zeroed report with no activity.
    pub fn empty(period: String) -> Self {
        Self {
            period,
            metrics: ReportMetrics::default(),
            recent_activity: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: String,
    pub status: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VacancyMonthlySummary {
    pub company: Option<String>,
    pub position: Option<String>,
    pub current_stage: Option<String>,
    pub history: Vec<HistoryEntry>,
}
