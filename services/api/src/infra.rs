use job_tracker::config::StorageConfig;
use job_tracker::error::AppError;
use job_tracker::tracker::{AnalyticsService, CsvRecordStore, VacancyService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// CRUD and analytics services sharing one file-backed store.
pub(crate) struct Tracker {
    pub(crate) vacancies: Arc<VacancyService<CsvRecordStore>>,
    pub(crate) analytics: Arc<AnalyticsService<CsvRecordStore>>,
}

/// Opens the data directory, creating header-only collections on first use.
pub(crate) fn open_tracker(storage: StorageConfig) -> Result<Tracker, AppError> {
    let data_dir = storage.data_dir.clone();
    let store = Arc::new(CsvRecordStore::open(storage)?);
    info!(data_dir = %data_dir.display(), "record store opened");

    Ok(Tracker {
        vacancies: Arc::new(VacancyService::new(store.clone())),
        analytics: Arc::new(AnalyticsService::new(store)),
    })
}
