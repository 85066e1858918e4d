//! Job-search tracking: vacancies, their stage-event log, and monthly analytics.
//!
//! [`VacancyService`] owns every write so that each stage transition leaves exactly one
//! `status_change` event behind. [`AnalyticsService`] only reads, and degrades to empty
//! projections instead of failing.

pub mod analytics;
pub mod domain;
pub mod router;
pub mod service;
pub mod store;
pub mod timestamp;

#[cfg(test)]
mod tests;

pub use analytics::{AnalyticsService, MonthlyReport, ReportOutcome, VacancyMonthlySummary};
pub use domain::{
    Event, EventDraft, EventId, EventType, Stage, UnknownVariant, Vacancy, VacancyDraft,
    VacancyId, WorkFormat,
};
pub use router::{export_filename, tracker_router, TrackerState};
pub use service::{TrackerServiceError, VacancyService};
pub use store::{CsvRecordStore, MemoryRecordStore, RecordStore, StoreError};
