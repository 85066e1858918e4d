use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;

use super::analytics::{requested_or_current, AnalyticsService};
use super::domain::{EventDraft, Stage, VacancyDraft, VacancyId};
use super::service::{TrackerServiceError, VacancyService};
use super::store::RecordStore;

const NOT_FOUND_DETAIL: &str = "Vacancy not found";

/// Shared handler state: the CRUD service and the analytics service over one store.
pub struct TrackerState<S> {
    pub vacancies: Arc<VacancyService<S>>,
    pub analytics: Arc<AnalyticsService<S>>,
}

impl<S> Clone for TrackerState<S> {
    fn clone(&self) -> Self {
        Self {
            vacancies: Arc::clone(&self.vacancies),
            analytics: Arc::clone(&self.analytics),
        }
    }
}

/// Router builder exposing the vacancy CRUD and monthly analytics endpoints.
pub fn tracker_router<S>(
    vacancies: Arc<VacancyService<S>>,
    analytics: Arc<AnalyticsService<S>>,
) -> Router
where
    S: RecordStore + 'static,
{
    Router::new()
        .route(
            "/api/vacancies",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .route(
            "/api/vacancies/:vacancy_id",
            get(get_handler::<S>)
                .put(update_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .route(
            "/api/vacancies/:vacancy_id/stage",
            patch(update_stage_handler::<S>),
        )
        .route(
            "/api/vacancies/:vacancy_id/events",
            get(events_handler::<S>).post(log_event_handler::<S>),
        )
        .route("/api/analytics/report", get(report_handler::<S>))
        .route("/api/analytics/export", get(export_handler::<S>))
        .route(
            "/api/analytics/detailed-report",
            get(detailed_report_handler::<S>),
        )
        .with_state(TrackerState {
            vacancies,
            analytics,
        })
}

#[derive(Debug, Deserialize)]
pub(crate) struct StageQuery {
    pub(crate) stage: String,
    #[serde(default)]
    pub(crate) comment: Option<String>,
}

/// `year`/`month` query pair; either one missing, blank or zero selects the current month.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PeriodQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub(crate) year: Option<i32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub(crate) month: Option<i32>,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl PeriodQuery {
    pub(crate) fn resolve(&self) -> (i32, i32) {
        requested_or_current(self.year, self.month)
    }
}

pub(crate) async fn list_handler<S>(State(state): State<TrackerState<S>>) -> Response
where
    S: RecordStore + 'static,
{
    let vacancies = state.vacancies;
    respond(move || vacancies.list()).await
}

pub(crate) async fn create_handler<S>(
    State(state): State<TrackerState<S>>,
    Json(draft): Json<VacancyDraft>,
) -> Response
where
    S: RecordStore + 'static,
{
    let vacancies = state.vacancies;
    respond(move || vacancies.create(draft)).await
}

pub(crate) async fn get_handler<S>(
    State(state): State<TrackerState<S>>,
    Path(vacancy_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    let vacancies = state.vacancies;
    respond(move || vacancies.get(&VacancyId(vacancy_id))).await
}

pub(crate) async fn update_handler<S>(
    State(state): State<TrackerState<S>>,
    Path(vacancy_id): Path<String>,
    Json(draft): Json<VacancyDraft>,
) -> Response
where
    S: RecordStore + 'static,
{
    let vacancies = state.vacancies;
    respond(move || vacancies.update_details(&VacancyId(vacancy_id), draft)).await
}

pub(crate) async fn delete_handler<S>(
    State(state): State<TrackerState<S>>,
    Path(vacancy_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    let vacancies = state.vacancies;
    respond(move || {
        vacancies
            .delete(&VacancyId(vacancy_id))
            .map(|()| json!({ "status": "deleted" }))
    })
    .await
}

pub(crate) async fn update_stage_handler<S>(
    State(state): State<TrackerState<S>>,
    Path(vacancy_id): Path<String>,
    Query(query): Query<StageQuery>,
) -> Response
where
    S: RecordStore + 'static,
{
    let stage = match query.stage.parse::<Stage>() {
        Ok(stage) => stage,
        Err(err) => {
            let payload = json!({ "detail": err.to_string() });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
        }
    };

    let vacancies = state.vacancies;
    let comment = query.comment;
    respond(move || vacancies.update_stage(&VacancyId(vacancy_id), stage, comment)).await
}

pub(crate) async fn events_handler<S>(
    State(state): State<TrackerState<S>>,
    Path(vacancy_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    let vacancies = state.vacancies;
    respond(move || vacancies.events_for_vacancy(&VacancyId(vacancy_id))).await
}

pub(crate) async fn log_event_handler<S>(
    State(state): State<TrackerState<S>>,
    Path(vacancy_id): Path<String>,
    Json(draft): Json<EventDraft>,
) -> Response
where
    S: RecordStore + 'static,
{
    let vacancies = state.vacancies;
    respond(move || vacancies.log_event(&VacancyId(vacancy_id), draft)).await
}

pub(crate) async fn report_handler<S>(
    State(state): State<TrackerState<S>>,
    Query(query): Query<PeriodQuery>,
) -> Response
where
    S: RecordStore + 'static,
{
    let (year, month) = query.resolve();
    let analytics = state.analytics;
    match offload(move || analytics.monthly_report(year, month).into_inner()).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn export_handler<S>(
    State(state): State<TrackerState<S>>,
    Query(query): Query<PeriodQuery>,
) -> Response
where
    S: RecordStore + 'static,
{
    let (year, month) = query.resolve();
    let analytics = state.analytics;
    let body = match offload(move || analytics.csv_export(year, month).into_inner()).await {
        Ok(body) => body,
        Err(response) => return response,
    };
    let disposition = format!("attachment; filename={}", export_filename(year, month));
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

pub(crate) async fn detailed_report_handler<S>(
    State(state): State<TrackerState<S>>,
    Query(query): Query<PeriodQuery>,
) -> Response
where
    S: RecordStore + 'static,
{
    let (year, month) = query.resolve();
    let analytics = state.analytics;
    match offload(move || analytics.detailed_summary(year, month).into_inner()).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(response) => response,
    }
}

/// Runs store-bound work on the blocking pool; every store adapter does synchronous I/O.
async fn offload<T, F>(work: F) -> Result<T, Response>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|err| {
        tracing::error!(error = %err, "tracker task did not complete");
        let payload = json!({ "error": "request could not be completed" });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
    })
}

async fn respond<T, F>(work: F) -> Response
where
    F: FnOnce() -> Result<T, TrackerServiceError> + Send + 'static,
    T: Serialize + Send + 'static,
{
    match offload(work).await {
        Ok(Ok(value)) => (StatusCode::OK, Json(value)).into_response(),
        Ok(Err(err)) => service_error_response(err),
        Err(response) => response,
    }
}

/// Attachment name for a monthly export, e.g. `job_search_report_2024_05.csv`.
pub fn export_filename(year: i32, month: i32) -> String {
    format!("job_search_report_{year}_{month:02}.csv")
}

fn service_error_response(err: TrackerServiceError) -> Response {
    match err {
        TrackerServiceError::VacancyNotFound(_) => {
            let payload = json!({ "detail": NOT_FOUND_DETAIL });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        other => {
            tracing::error!(error = %other, "vacancy request failed");
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
