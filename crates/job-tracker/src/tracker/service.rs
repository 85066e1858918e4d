use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use super::domain::{
    Event, EventDraft, EventId, Stage, Vacancy, VacancyDraft, VacancyId,
};
use super::store::{EventRow, RecordError, RecordStore, StoreError, VacancyRow};
use super::timestamp::{self, format_iso_micros};

const CREATION_COMMENT: &str = "Vacancy created";

/// Opaque identifier: the first ten hex digits of a random UUID.
fn next_record_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(10);
    id
}

/// CRUD facade over the record store.
///
/// Every change of `stage` goes through here so that exactly one `status_change` event is
/// appended per transition; the analytics counters rely on that.
pub struct VacancyService<S> {
    store: Arc<S>,
}

impl<S> VacancyService<S>
where
    S: RecordStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Store a new vacancy at stage `new` and log its creation event.
    ///
    /// If the event cannot be appended the vacancy is removed again.
    pub fn create(&self, draft: VacancyDraft) -> Result<Vacancy, TrackerServiceError> {
        let now = timestamp::now();
        let vacancy = Vacancy::from_draft(VacancyId(next_record_id()), draft, now);
        self.store.insert_vacancy(VacancyRow::from(&vacancy))?;

        let event = Event::status_change(
            EventId(next_record_id()),
            vacancy.id.clone(),
            now,
            None,
            Stage::New,
            Some(CREATION_COMMENT.to_string()),
        );
        if let Err(err) = self.store.append_event(EventRow::from(&event)) {
            if let Err(rollback) = self.store.delete_vacancy(vacancy.id.as_str()) {
                error!(
                    vacancy_id = %vacancy.id,
                    error = %rollback,
                    "vacancy stored without its creation event"
                );
            }
            return Err(err.into());
        }

        info!(vacancy_id = %vacancy.id, company = %vacancy.company, "vacancy created");
        Ok(vacancy)
    }

    /// All well-formed vacancies in store order; malformed rows are skipped and logged.
    pub fn list(&self) -> Result<Vec<Vacancy>, TrackerServiceError> {
        let rows = self.store.vacancies()?;
        Ok(rows
            .iter()
            .filter_map(|row| match Vacancy::try_from(row) {
                Ok(vacancy) => Some(vacancy),
                Err(err) => {
                    warn!(error = %err, "skipping malformed vacancy row");
                    None
                }
            })
            .collect())
    }

    pub fn get(&self, id: &VacancyId) -> Result<Vacancy, TrackerServiceError> {
        let row = self.fetch_row(id)?;
        Ok(Vacancy::try_from(&row)?)
    }

    /// Move a vacancy to `stage`. A request for the current stage is a no-op and logs nothing.
    pub fn update_stage(
        &self,
        id: &VacancyId,
        stage: Stage,
        comment: Option<String>,
    ) -> Result<Vacancy, TrackerServiceError> {
        let mut row = self.fetch_row(id)?;
        if row.stage.as_deref() == Some(stage.as_str()) {
            return Ok(Vacancy::try_from(&row)?);
        }

        let stage_from = row
            .stage
            .as_deref()
            .and_then(|raw| raw.parse::<Stage>().ok());
        let now = timestamp::now();
        let previous = row.clone();
        row.stage = Some(stage.as_str().to_string());
        row.updated_at = Some(format_iso_micros(now));
        self.store
            .update_vacancy(row.clone())
            .map_err(|err| not_found_as(err, id))?;

        let event = Event::status_change(
            EventId(next_record_id()),
            id.clone(),
            now,
            stage_from,
            stage,
            comment,
        );
        if let Err(err) = self.store.append_event(EventRow::from(&event)) {
            if let Err(rollback) = self.store.update_vacancy(previous) {
                error!(
                    vacancy_id = %id,
                    error = %rollback,
                    "stage changed without a status_change event"
                );
            }
            return Err(err.into());
        }

        info!(
            vacancy_id = %id,
            from = stage_from.map(Stage::as_str).unwrap_or("-"),
            to = stage.as_str(),
            "vacancy stage changed"
        );
        Ok(Vacancy::try_from(&row)?)
    }

    /// Replace the descriptive fields; stage and creation time are kept, no event is logged.
    pub fn update_details(
        &self,
        id: &VacancyId,
        draft: VacancyDraft,
    ) -> Result<Vacancy, TrackerServiceError> {
        let mut vacancy = self.get(id)?;
        vacancy.apply_draft(draft, timestamp::now());
        self.store
            .update_vacancy(VacancyRow::from(&vacancy))
            .map_err(|err| not_found_as(err, id))?;
        Ok(vacancy)
    }

    /// Delete a vacancy together with all of its events.
    pub fn delete(&self, id: &VacancyId) -> Result<(), TrackerServiceError> {
        let removed = self
            .store
            .delete_vacancy(id.as_str())
            .map_err(|err| not_found_as(err, id))?;
        info!(vacancy_id = %id, events_removed = removed, "vacancy deleted");
        Ok(())
    }

    /// Events referencing `id` in store order. Unknown ids simply have no events.
    pub fn events_for_vacancy(&self, id: &VacancyId) -> Result<Vec<Event>, TrackerServiceError> {
        let rows = self.store.events_for_vacancy(id.as_str())?;
        Ok(rows
            .iter()
            .filter_map(|row| match Event::try_from(row) {
                Ok(event) => Some(event),
                Err(err) => {
                    warn!(error = %err, "skipping malformed event row");
                    None
                }
            })
            .collect())
    }

    /// Append a manually recorded event (note, interview, offer) to an existing vacancy.
    pub fn log_event(
        &self,
        id: &VacancyId,
        draft: EventDraft,
    ) -> Result<Event, TrackerServiceError> {
        self.fetch_row(id)?;

        let EventDraft {
            kind,
            comment,
            stage_from,
            stage_to,
        } = draft;
        let event = Event {
            id: EventId(next_record_id()),
            vacancy_id: id.clone(),
            timestamp: timestamp::now(),
            kind,
            stage_from,
            stage_to,
            comment,
        };
        self.store.append_event(EventRow::from(&event))?;
        info!(vacancy_id = %id, kind = kind.as_str(), "event logged");
        Ok(event)
    }

    fn fetch_row(&self, id: &VacancyId) -> Result<VacancyRow, TrackerServiceError> {
        self.store
            .vacancy(id.as_str())?
            .ok_or_else(|| TrackerServiceError::VacancyNotFound(id.clone()))
    }
}

fn not_found_as(err: StoreError, id: &VacancyId) -> TrackerServiceError {
    match err {
        StoreError::NotFound => TrackerServiceError::VacancyNotFound(id.clone()),
        other => TrackerServiceError::Store(other),
    }
}

/// Error raised by the vacancy service.
#[derive(Debug, thiserror::Error)]
pub enum TrackerServiceError {
    #[error("vacancy {0} not found")]
    VacancyNotFound(VacancyId),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    InvalidRecord(#[from] RecordError),
}
