use serde::{Deserialize, Deserializer, Serialize};

use super::super::domain::{
    Event, EventId, EventType, Stage, UnknownVariant, Vacancy, VacancyId, WorkFormat,
};
use super::super::timestamp::{format_iso_micros, parse_timestamp};

pub const VACANCY_COLUMNS: [&str; 15] = [
    "id",
    "created_at",
    "company",
    "position",
    "location",
    "work_format",
    "link",
    "salary_min",
    "salary_max",
    "currency",
    "source",
    "contacts",
    "stage",
    "notes",
    "updated_at",
];

pub const EVENT_COLUMNS: [&str; 7] = [
    "id",
    "vacancy_id",
    "timestamp",
    "type",
    "stage_from",
    "stage_to",
    "comment",
];

/// Persisted vacancy exactly as stored; any column other than `id` may be absent.
///
/// Field order matches [`VACANCY_COLUMNS`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VacancyRow {
    pub id: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub work_format: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub salary_min: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub salary_max: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub contacts: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub stage: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub updated_at: Option<String>,
}

/// Persisted event exactly as stored. Field order matches [`EVENT_COLUMNS`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    pub id: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub vacancy_id: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub timestamp: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "blank_as_none")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub stage_from: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub stage_to: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub comment: Option<String>,
}

impl EventRow {
    pub fn belongs_to(&self, vacancy_id: &str) -> bool {
        self.vacancy_id.as_deref() == Some(vacancy_id)
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// A stored row that cannot be lifted into the typed domain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("record {id}: missing required column '{column}'")]
    Missing { id: String, column: &'static str },
    #[error("record {id}: column '{column}' holds unparsable value '{value}'")]
    Unparsable {
        id: String,
        column: &'static str,
        value: String,
    },
}

fn required<'a>(
    id: &str,
    column: &'static str,
    value: &'a Option<String>,
) -> Result<&'a str, RecordError> {
    value.as_deref().ok_or_else(|| RecordError::Missing {
        id: id.to_string(),
        column,
    })
}

fn unparsable(id: &str, column: &'static str, value: &str) -> RecordError {
    RecordError::Unparsable {
        id: id.to_string(),
        column,
        value: value.to_string(),
    }
}

fn timestamp_column(
    id: &str,
    column: &'static str,
    value: &Option<String>,
) -> Result<chrono::NaiveDateTime, RecordError> {
    let raw = required(id, column, value)?;
    parse_timestamp(raw).ok_or_else(|| unparsable(id, column, raw))
}

fn optional_number(
    id: &str,
    column: &'static str,
    value: &Option<String>,
) -> Result<Option<f64>, RecordError> {
    value
        .as_deref()
        .map(|raw| {
            raw.trim()
                .parse::<f64>()
                .map_err(|_| unparsable(id, column, raw))
        })
        .transpose()
}

fn optional_variant<T>(value: &Option<String>) -> Result<Option<T>, UnknownVariant>
where
    T: std::str::FromStr<Err = UnknownVariant>,
{
    value.as_deref().map(str::parse).transpose()
}

fn format_number(value: f64) -> String {
    value.to_string()
}

impl From<&Vacancy> for VacancyRow {
    fn from(vacancy: &Vacancy) -> Self {
        Self {
            id: vacancy.id.0.clone(),
            created_at: Some(format_iso_micros(vacancy.created_at)),
            company: Some(vacancy.company.clone()),
            position: Some(vacancy.position.clone()),
            location: vacancy.location.clone(),
            work_format: vacancy.work_format.map(|format| format.as_str().to_string()),
            link: vacancy.link.clone(),
            salary_min: vacancy.salary_min.map(format_number),
            salary_max: vacancy.salary_max.map(format_number),
            currency: vacancy.currency.clone(),
            source: vacancy.source.clone(),
            contacts: vacancy.contacts.clone(),
            stage: Some(vacancy.stage.as_str().to_string()),
            notes: vacancy.notes.clone(),
            updated_at: Some(format_iso_micros(vacancy.updated_at)),
        }
    }
}

impl TryFrom<&VacancyRow> for Vacancy {
    type Error = RecordError;

    fn try_from(row: &VacancyRow) -> Result<Self, Self::Error> {
        let id = row.id.as_str();
        let created_at = timestamp_column(id, "created_at", &row.created_at)?;
        let updated_at = match row.updated_at.as_deref().and_then(parse_timestamp) {
            Some(value) => value,
            None => created_at,
        };
        let stage_raw = required(id, "stage", &row.stage)?;
        let stage = stage_raw
            .parse::<Stage>()
            .map_err(|_| unparsable(id, "stage", stage_raw))?;
        let work_format = optional_variant::<WorkFormat>(&row.work_format)
            .map_err(|err| unparsable(id, "work_format", &err.value))?;

        Ok(Self {
            id: VacancyId(row.id.clone()),
            created_at,
            company: required(id, "company", &row.company)?.to_string(),
            position: required(id, "position", &row.position)?.to_string(),
            location: row.location.clone(),
            work_format,
            link: row.link.clone(),
            salary_min: optional_number(id, "salary_min", &row.salary_min)?,
            salary_max: optional_number(id, "salary_max", &row.salary_max)?,
            currency: row.currency.clone(),
            source: row.source.clone(),
            contacts: row.contacts.clone(),
            stage,
            notes: row.notes.clone(),
            updated_at,
        })
    }
}

impl From<&Event> for EventRow {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id.0.clone(),
            vacancy_id: Some(event.vacancy_id.0.clone()),
            timestamp: Some(format_iso_micros(event.timestamp)),
            kind: Some(event.kind.as_str().to_string()),
            stage_from: event.stage_from.map(|stage| stage.as_str().to_string()),
            stage_to: event.stage_to.map(|stage| stage.as_str().to_string()),
            comment: event.comment.clone(),
        }
    }
}

impl TryFrom<&EventRow> for Event {
    type Error = RecordError;

    fn try_from(row: &EventRow) -> Result<Self, Self::Error> {
        let id = row.id.as_str();
        let kind_raw = required(id, "type", &row.kind)?;
        let kind = kind_raw
            .parse::<EventType>()
            .map_err(|_| unparsable(id, "type", kind_raw))?;
        let stage_from = optional_variant::<Stage>(&row.stage_from)
            .map_err(|err| unparsable(id, "stage_from", &err.value))?;
        let stage_to = optional_variant::<Stage>(&row.stage_to)
            .map_err(|err| unparsable(id, "stage_to", &err.value))?;

        Ok(Self {
            id: EventId(row.id.clone()),
            vacancy_id: VacancyId(required(id, "vacancy_id", &row.vacancy_id)?.to_string()),
            timestamp: timestamp_column(id, "timestamp", &row.timestamp)?,
            kind,
            stage_from,
            stage_to,
            comment: row.comment.clone(),
        })
    }
}
