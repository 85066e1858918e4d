//! Monthly aggregations over the raw vacancy and event collections.
//!
//! The projection functions are pure and operate on rows as stored. [`AnalyticsService`]
//! loads the collections per call and turns every failure into the projection's default.

mod dated;
mod detailed;
mod export;
mod period;
mod service;
mod summary;
pub mod views;

pub use detailed::detailed_summary;
pub use export::{csv_export, EXPORT_FAILURE_BODY, EXPORT_HEADER};
pub use period::{period_label, requested_or_current, ReportPeriod};
pub use service::{AnalyticsService, FallbackReason, ReportOutcome};
pub use summary::{monthly_report, RECENT_ACTIVITY_LIMIT};
pub use views::{
    ActivityRecord, HistoryEntry, MonthlyReport, ReportMetrics, VacancyMonthlySummary,
};

/// Failure inside a report computation. Never surfaces past [`AnalyticsService`].
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("{year}-{month} is not a valid calendar month")]
    InvalidPeriod { year: i32, month: i32 },
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("report buffer failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("report is not valid utf-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}
