use std::sync::Arc;

use tracing::{error, warn};

use super::super::store::{EventRow, RecordStore, VacancyRow};
use super::detailed::detailed_summary;
use super::export::{csv_export, EXPORT_FAILURE_BODY, EXPORT_HEADER};
use super::period::{period_label, ReportPeriod};
use super::summary::monthly_report;
use super::views::{MonthlyReport, VacancyMonthlySummary};
use super::AnalyticsError;

/// Result of a report call: either the computed projection or its documented default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome<T> {
    Computed(T),
    Fallback { value: T, reason: FallbackReason },
}

impl<T> ReportOutcome<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Computed(value) | Self::Fallback { value, .. } => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Computed(value) | Self::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    InvalidPeriod,
    Failed(String),
}

/// Monthly projections over whatever the store holds at call time.
///
/// Reads never fail: an unreadable collection is treated as empty and every other fault
/// is logged and replaced by the projection's default.
pub struct AnalyticsService<S> {
    store: Arc<S>,
}

impl<S> AnalyticsService<S>
where
    S: RecordStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn monthly_report(&self, year: i32, month: i32) -> ReportOutcome<MonthlyReport> {
        let default = || MonthlyReport::empty(period_label(year, month));
        self.guarded("monthly report", year, month, default, |vacancies, events, period| {
            Ok(monthly_report(vacancies, events, period))
        })
    }

    pub fn csv_export(&self, year: i32, month: i32) -> ReportOutcome<String> {
        match self.guarded("csv export", year, month, header_only, |vacancies, events, period| {
            csv_export(vacancies, events, period)
        }) {
            ReportOutcome::Fallback {
                reason: reason @ FallbackReason::Failed(_),
                ..
            } => ReportOutcome::Fallback {
                value: EXPORT_FAILURE_BODY.to_string(),
                reason,
            },
            outcome => outcome,
        }
    }

    pub fn detailed_summary(
        &self,
        year: i32,
        month: i32,
    ) -> ReportOutcome<Vec<VacancyMonthlySummary>> {
        self.guarded("detailed summary", year, month, Vec::new, |vacancies, events, period| {
            Ok(detailed_summary(vacancies, events, period))
        })
    }

    fn guarded<T, D, F>(
        &self,
        report: &'static str,
        year: i32,
        month: i32,
        default: D,
        compute: F,
    ) -> ReportOutcome<T>
    where
        D: FnOnce() -> T,
        F: FnOnce(&[VacancyRow], &[EventRow], &ReportPeriod) -> Result<T, AnalyticsError>,
    {
        let period = match ReportPeriod::resolve(year, month) {
            Ok(period) => period,
            Err(err) => {
                warn!(report, error = %err, "invalid report period, returning default");
                return ReportOutcome::Fallback {
                    value: default(),
                    reason: FallbackReason::InvalidPeriod,
                };
            }
        };

        let vacancies = self.load("vacancies", || self.store.vacancies());
        let events = self.load("events", || self.store.events());

        match compute(&vacancies, &events, &period) {
            Ok(value) => ReportOutcome::Computed(value),
            Err(err) => {
                error!(report, period = %period.label(), error = %err, "report generation failed");
                ReportOutcome::Fallback {
                    value: default(),
                    reason: FallbackReason::Failed(err.to_string()),
                }
            }
        }
    }

    fn load<T, F, E>(&self, collection: &'static str, read: F) -> Vec<T>
    where
        F: FnOnce() -> Result<Vec<T>, E>,
        E: std::fmt::Display,
    {
        read().unwrap_or_else(|err| {
            warn!(collection, error = %err, "collection unreadable, treating as empty");
            Vec::new()
        })
    }
}

fn header_only() -> String {
    let mut line = EXPORT_HEADER.join(",");
    line.push('\n');
    line
}
