use std::sync::Arc;

use axum::response::Response;
use axum::Router;
use serde_json::Value;

use crate::tracker::analytics::AnalyticsService;
use crate::tracker::router::{tracker_router, TrackerState};
use crate::tracker::service::VacancyService;
use crate::tracker::store::{
    EventRow, MemoryRecordStore, RecordStore, StoreError, VacancyRow,
};

pub(super) const BODY_LIMIT: usize = 64 * 1024;

pub(super) fn services<S>(store: Arc<S>) -> (Arc<VacancyService<S>>, Arc<AnalyticsService<S>>)
where
    S: RecordStore + 'static,
{
    (
        Arc::new(VacancyService::new(store.clone())),
        Arc::new(AnalyticsService::new(store)),
    )
}

pub(super) fn state<S>(store: Arc<S>) -> TrackerState<S>
where
    S: RecordStore + 'static,
{
    let (vacancies, analytics) = services(store);
    TrackerState {
        vacancies,
        analytics,
    }
}

pub(super) fn router<S>(store: Arc<S>) -> Router
where
    S: RecordStore + 'static,
{
    let (vacancies, analytics) = services(store);
    tracker_router(vacancies, analytics)
}

pub(super) fn vacancy_row(id: &str, created_at: &str, stage: &str) -> VacancyRow {
    VacancyRow {
        id: id.to_string(),
        created_at: Some(created_at.to_string()),
        company: Some("Northwind".to_string()),
        position: Some("Backend Engineer".to_string()),
        work_format: Some("remote".to_string()),
        stage: Some(stage.to_string()),
        updated_at: Some(created_at.to_string()),
        ..VacancyRow::default()
    }
}

pub(super) fn status_change_row(
    id: &str,
    vacancy_id: &str,
    timestamp: &str,
    stage_to: &str,
) -> EventRow {
    EventRow {
        id: id.to_string(),
        vacancy_id: Some(vacancy_id.to_string()),
        timestamp: Some(timestamp.to_string()),
        kind: Some("status_change".to_string()),
        stage_to: Some(stage_to.to_string()),
        ..EventRow::default()
    }
}

/// One vacancy created on 2024-05-02 that reached `interview` within May.
pub(super) fn may_store() -> MemoryRecordStore {
    MemoryRecordStore::with_rows(
        vec![vacancy_row("v1", "2024-05-02", "interview")],
        vec![
            status_change_row("e1", "v1", "2024-05-03", "applied"),
            status_change_row("e2", "v1", "2024-05-10", "interview"),
        ],
    )
}

/// Store whose every operation fails, standing in for an unreadable data directory.
pub(super) struct UnavailableStore;

fn offline() -> StoreError {
    StoreError::Io(std::io::Error::new(
        std::io::ErrorKind::PermissionDenied,
        "data directory offline",
    ))
}

impl RecordStore for UnavailableStore {
    fn vacancies(&self) -> Result<Vec<VacancyRow>, StoreError> {
        Err(offline())
    }

    fn events(&self) -> Result<Vec<EventRow>, StoreError> {
        Err(offline())
    }

    fn insert_vacancy(&self, _row: VacancyRow) -> Result<(), StoreError> {
        Err(offline())
    }

    fn update_vacancy(&self, _row: VacancyRow) -> Result<(), StoreError> {
        Err(offline())
    }

    fn delete_vacancy(&self, _id: &str) -> Result<usize, StoreError> {
        Err(offline())
    }

    fn append_event(&self, _row: EventRow) -> Result<(), StoreError> {
        Err(offline())
    }
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = read_body(response).await;
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    String::from_utf8(read_body(response).await).expect("utf-8 body")
}
