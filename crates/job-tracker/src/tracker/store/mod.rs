//! Record store port and its adapters.
//!
//! Vacancies and events live in two flat collections joined at query time by `vacancy_id`.
//! Adapters hand out raw rows; the service layer lifts them into the typed domain and the
//! analytics engine consumes them as-is.

mod csv_file;
mod memory;
mod rows;

pub use csv_file::CsvRecordStore;
pub use memory::MemoryRecordStore;
pub use rows::{EventRow, RecordError, VacancyRow, EVENT_COLUMNS, VACANCY_COLUMNS};

/// Storage abstraction so the service and analytics modules can be exercised in isolation.
pub trait RecordStore: Send + Sync {
    fn vacancies(&self) -> Result<Vec<VacancyRow>, StoreError>;
    fn events(&self) -> Result<Vec<EventRow>, StoreError>;
    fn insert_vacancy(&self, row: VacancyRow) -> Result<(), StoreError>;
    /// Replaces the row sharing `row.id`.
    fn update_vacancy(&self, row: VacancyRow) -> Result<(), StoreError>;
    /// Removes the vacancy and every event referencing it, returning the number of events dropped.
    fn delete_vacancy(&self, id: &str) -> Result<usize, StoreError>;
    fn append_event(&self, row: EventRow) -> Result<(), StoreError>;

    fn vacancy(&self, id: &str) -> Result<Option<VacancyRow>, StoreError> {
        Ok(self.vacancies()?.into_iter().find(|row| row.id == id))
    }

    fn events_for_vacancy(&self, id: &str) -> Result<Vec<EventRow>, StoreError> {
        Ok(self
            .events()?
            .into_iter()
            .filter(|row| row.belongs_to(id))
            .collect())
    }
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("store encoding failure: {0}")]
    Csv(#[from] csv::Error),
    #[error("collection '{collection}' is unreadable: {reason}")]
    Corrupt {
        collection: &'static str,
        reason: String,
    },
}
