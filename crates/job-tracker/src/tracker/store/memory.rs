use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::rows::{EventRow, VacancyRow};
use super::{RecordStore, StoreError};

#[derive(Debug, Default)]
struct Collections {
    vacancies: Vec<VacancyRow>,
    events: Vec<EventRow>,
}

/// In-process adapter with the same semantics as the file store. Clones share state.
#[derive(Debug, Default, Clone)]
pub struct MemoryRecordStore {
    inner: Arc<Mutex<Collections>>,
}

impl MemoryRecordStore {
    /// Seeds the store with raw rows, bypassing duplicate checks.
    pub fn with_rows(vacancies: Vec<VacancyRow>, events: Vec<EventRow>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Collections { vacancies, events })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RecordStore for MemoryRecordStore {
    fn vacancies(&self) -> Result<Vec<VacancyRow>, StoreError> {
        Ok(self.lock().vacancies.clone())
    }

    fn events(&self) -> Result<Vec<EventRow>, StoreError> {
        Ok(self.lock().events.clone())
    }

    fn insert_vacancy(&self, row: VacancyRow) -> Result<(), StoreError> {
        let mut guard = self.lock();
        if guard.vacancies.iter().any(|existing| existing.id == row.id) {
            return Err(StoreError::Conflict);
        }
        guard.vacancies.push(row);
        Ok(())
    }

    fn update_vacancy(&self, row: VacancyRow) -> Result<(), StoreError> {
        let mut guard = self.lock();
        let slot = guard
            .vacancies
            .iter_mut()
            .find(|existing| existing.id == row.id)
            .ok_or(StoreError::NotFound)?;
        *slot = row;
        Ok(())
    }

    fn delete_vacancy(&self, id: &str) -> Result<usize, StoreError> {
        let mut guard = self.lock();
        let before = guard.vacancies.len();
        guard.vacancies.retain(|row| row.id != id);
        if guard.vacancies.len() == before {
            return Err(StoreError::NotFound);
        }
        let total = guard.events.len();
        guard.events.retain(|row| !row.belongs_to(id));
        Ok(total - guard.events.len())
    }

    fn append_event(&self, row: EventRow) -> Result<(), StoreError> {
        let mut guard = self.lock();
        if guard.events.iter().any(|existing| existing.id == row.id) {
            return Err(StoreError::Conflict);
        }
        guard.events.push(row);
        Ok(())
    }
}
