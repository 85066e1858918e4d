use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::rows::{EventRow, VacancyRow, EVENT_COLUMNS, VACANCY_COLUMNS};
use super::{RecordStore, StoreError};
use crate::config::StorageConfig;

/// Flat-file adapter keeping each collection in a header-first CSV file.
///
/// Every mutation rewrites the affected file through a temporary sibling and a rename.
/// Mutations inside one process are serialized; separate processes sharing the directory
/// are not coordinated.
#[derive(Debug)]
pub struct CsvRecordStore {
    config: StorageConfig,
    write_lock: Mutex<()>,
}

impl CsvRecordStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// Builds the store and creates any missing directory or header-only file.
    pub fn open(config: StorageConfig) -> Result<Self, StoreError> {
        let store = Self::new(config);
        store.ensure_initialized()?;
        Ok(store)
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn ensure_initialized(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.config.data_dir)?;

        let vacancies = self.config.vacancies_path();
        if !vacancies.exists() {
            write_rows::<VacancyRow>(&vacancies, &VACANCY_COLUMNS, &[])?;
            debug!(path = %vacancies.display(), "initialized vacancy collection");
        }

        let events = self.config.events_path();
        if !events.exists() {
            write_rows::<EventRow>(&events, &EVENT_COLUMNS, &[])?;
            debug!(path = %events.display(), "initialized event collection");
        }

        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_vacancies(&self, rows: &[VacancyRow]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.config.data_dir)?;
        write_rows(&self.config.vacancies_path(), &VACANCY_COLUMNS, rows)
    }

    fn write_events(&self, rows: &[EventRow]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.config.data_dir)?;
        write_rows(&self.config.events_path(), &EVENT_COLUMNS, rows)
    }
}

impl RecordStore for CsvRecordStore {
    fn vacancies(&self) -> Result<Vec<VacancyRow>, StoreError> {
        read_rows(&self.config.vacancies_path(), "vacancies")
    }

    fn events(&self) -> Result<Vec<EventRow>, StoreError> {
        read_rows(&self.config.events_path(), "events")
    }

    fn insert_vacancy(&self, row: VacancyRow) -> Result<(), StoreError> {
        let _guard = self.lock();
        let mut rows = self.vacancies()?;
        if rows.iter().any(|existing| existing.id == row.id) {
            return Err(StoreError::Conflict);
        }
        rows.push(row);
        self.write_vacancies(&rows)
    }

    fn update_vacancy(&self, row: VacancyRow) -> Result<(), StoreError> {
        let _guard = self.lock();
        let mut rows = self.vacancies()?;
        let slot = rows
            .iter_mut()
            .find(|existing| existing.id == row.id)
            .ok_or(StoreError::NotFound)?;
        *slot = row;
        self.write_vacancies(&rows)
    }

    fn delete_vacancy(&self, id: &str) -> Result<usize, StoreError> {
        let _guard = self.lock();
        let mut vacancies = self.vacancies()?;
        let before = vacancies.len();
        vacancies.retain(|row| row.id != id);
        if vacancies.len() == before {
            return Err(StoreError::NotFound);
        }

        let mut events = self.events()?;
        let total = events.len();
        events.retain(|row| !row.belongs_to(id));
        let removed = total - events.len();

        // Events go first; no event may outlive its vacancy on disk.
        self.write_events(&events)?;
        self.write_vacancies(&vacancies)?;
        Ok(removed)
    }

    fn append_event(&self, row: EventRow) -> Result<(), StoreError> {
        let _guard = self.lock();
        let mut rows = self.events()?;
        if rows.iter().any(|existing| existing.id == row.id) {
            return Err(StoreError::Conflict);
        }
        rows.push(row);
        self.write_events(&rows)
    }
}

/// A missing file reads as an empty collection, exactly like a header-only file.
///
/// Short rows are accepted; their trailing columns read as absent.
fn read_rows<T: DeserializeOwned>(
    path: &Path,
    collection: &'static str,
) -> Result<Vec<T>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let corrupt = |reason: String| StoreError::Corrupt { collection, reason };

    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file);

    let headers = reader.headers().map_err(|err| corrupt(err.to_string()))?;
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    if !headers.iter().any(|header| header == "id") {
        return Err(corrupt("header row lacks an 'id' column".to_string()));
    }

    reader
        .deserialize::<T>()
        .map(|row| row.map_err(|err| corrupt(err.to_string())))
        .collect()
}

fn write_rows<T: Serialize>(path: &Path, columns: &[&str], rows: &[T]) -> Result<(), StoreError> {
    let staging = staging_path(path);
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_path(&staging)?;
        writer.write_record(columns)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    fs::rename(&staging, path)?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, CsvRecordStore) {
        let dir = TempDir::new().expect("temp dir");
        let store = CsvRecordStore::open(StorageConfig::new(dir.path().join("data")))
            .expect("store initializes");
        (dir, store)
    }

    fn vacancy(id: &str, company: &str) -> VacancyRow {
        VacancyRow {
            id: id.to_string(),
            created_at: Some("2024-05-02T09:00:00.000000".to_string()),
            company: Some(company.to_string()),
            position: Some("Engineer".to_string()),
            stage: Some("new".to_string()),
            ..VacancyRow::default()
        }
    }

    fn event(id: &str, vacancy_id: &str) -> EventRow {
        EventRow {
            id: id.to_string(),
            vacancy_id: Some(vacancy_id.to_string()),
            timestamp: Some("2024-05-03T10:00:00.000000".to_string()),
            kind: Some("note".to_string()),
            comment: Some("called back, said \"maybe\", will retry".to_string()),
            ..EventRow::default()
        }
    }

    #[test]
    fn open_writes_header_only_files() {
        let (_dir, store) = store();
        let raw = fs::read_to_string(store.config().vacancies_path()).expect("file exists");
        assert_eq!(raw, format!("{}\n", VACANCY_COLUMNS.join(",")));
        let raw = fs::read_to_string(store.config().events_path()).expect("file exists");
        assert_eq!(raw, format!("{}\n", EVENT_COLUMNS.join(",")));

        assert!(store.vacancies().expect("readable").is_empty());
        assert!(store.events().expect("readable").is_empty());
    }

    #[test]
    fn missing_files_read_as_empty_collections() {
        let dir = TempDir::new().expect("temp dir");
        let store = CsvRecordStore::new(StorageConfig::new(dir.path().join("absent")));
        assert!(store.vacancies().expect("missing is empty").is_empty());
        assert!(store.events().expect("missing is empty").is_empty());
    }

    #[test]
    fn rows_survive_a_write_read_cycle_with_quoting() {
        let (_dir, store) = store();
        store
            .insert_vacancy(vacancy("v1", "Acme, Inc."))
            .expect("insert");
        store.append_event(event("e1", "v1")).expect("append");

        let vacancies = store.vacancies().expect("read");
        assert_eq!(vacancies, vec![vacancy("v1", "Acme, Inc.")]);
        let events = store.events_for_vacancy("v1").expect("read");
        assert_eq!(events, vec![event("e1", "v1")]);
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let (_dir, store) = store();
        store.insert_vacancy(vacancy("v1", "Acme")).expect("insert");
        assert!(matches!(
            store.insert_vacancy(vacancy("v1", "Other")),
            Err(StoreError::Conflict)
        ));
    }

    #[test]
    fn update_replaces_matching_row_only() {
        let (_dir, store) = store();
        store.insert_vacancy(vacancy("v1", "Acme")).expect("insert");
        store.insert_vacancy(vacancy("v2", "Globex")).expect("insert");

        let mut changed = vacancy("v2", "Globex");
        changed.stage = Some("applied".to_string());
        store.update_vacancy(changed.clone()).expect("update");

        assert_eq!(
            store.vacancy("v2").expect("read"),
            Some(changed),
            "second row replaced"
        );
        assert_eq!(store.vacancy("v1").expect("read"), Some(vacancy("v1", "Acme")));
        assert!(matches!(
            store.update_vacancy(vacancy("v9", "Nobody")),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn delete_cascades_to_events() {
        let (_dir, store) = store();
        store.insert_vacancy(vacancy("v1", "Acme")).expect("insert");
        store.insert_vacancy(vacancy("v2", "Globex")).expect("insert");
        store.append_event(event("e1", "v1")).expect("append");
        store.append_event(event("e2", "v2")).expect("append");
        store.append_event(event("e3", "v1")).expect("append");

        let removed = store.delete_vacancy("v1").expect("delete");
        assert_eq!(removed, 2);
        assert_eq!(store.vacancy("v1").expect("read"), None);
        let remaining: Vec<String> = store
            .events()
            .expect("read")
            .into_iter()
            .map(|row| row.id)
            .collect();
        assert_eq!(remaining, vec!["e2".to_string()]);
        assert!(matches!(
            store.delete_vacancy("v1"),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn foreign_header_row_is_reported_as_corrupt() {
        let (_dir, store) = store();
        fs::write(store.config().events_path(), "when,what\n2024-05-01,lunch\n")
            .expect("overwrite");
        assert!(matches!(
            store.events(),
            Err(StoreError::Corrupt {
                collection: "events",
                ..
            })
        ));
    }

    #[test]
    fn short_rows_read_with_trailing_columns_absent() {
        let (_dir, store) = store();
        fs::write(
            store.config().events_path(),
            "id,vacancy_id,timestamp,type,stage_from,stage_to,comment\n\
             e1,v1,2024-05-03,status_change,new,applied,ok\n\
             e2,v1,2024-05-04,note\n\
             e3\n",
        )
        .expect("overwrite");

        let events = store.events().expect("short rows are readable");
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].kind.as_deref(), Some("note"));
        assert_eq!(events[1].comment, None);
        assert_eq!(events[2].timestamp, None);
    }

    #[test]
    fn failed_event_rewrite_keeps_the_vacancy() {
        let (_dir, store) = store();
        store.insert_vacancy(vacancy("v1", "Acme")).expect("insert");
        store.append_event(event("e1", "v1")).expect("append");

        let events_path = store.config().events_path();
        fs::create_dir(staging_path(&events_path)).expect("block staging file");

        assert!(store.delete_vacancy("v1").is_err());
        assert!(store.vacancy("v1").expect("read").is_some());
        assert_eq!(store.events_for_vacancy("v1").expect("read").len(), 1);
    }

    #[test]
    fn zero_byte_file_reads_as_empty() {
        let (_dir, store) = store();
        fs::write(store.config().vacancies_path(), "").expect("truncate");
        assert!(store.vacancies().expect("empty file").is_empty());
    }
}
