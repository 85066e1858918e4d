use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pipeline position of a vacancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    New,
    Applied,
    Response,
    Interview,
    Offer,
    Rejected,
    Closed,
}

impl Stage {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::New,
            Self::Applied,
            Self::Response,
            Self::Interview,
            Self::Offer,
            Self::Rejected,
            Self::Closed,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Applied => "applied",
            Self::Response => "response",
            Self::Interview => "interview",
            Self::Offer => "offer",
            Self::Rejected => "rejected",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|stage| stage.as_str() == value.trim())
            .ok_or_else(|| UnknownVariant::new("stage", value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkFormat {
    Remote,
    Hybrid,
    Office,
}

impl WorkFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Hybrid => "hybrid",
            Self::Office => "office",
        }
    }
}

impl FromStr for WorkFormat {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "remote" => Ok(Self::Remote),
            "hybrid" => Ok(Self::Hybrid),
            "office" => Ok(Self::Office),
            _ => Err(UnknownVariant::new("work_format", value)),
        }
    }
}

/// Kind of activity recorded against a vacancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    StatusChange,
    Note,
    Interview,
    Offer,
}

impl EventType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StatusChange => "status_change",
            Self::Note => "note",
            Self::Interview => "interview",
            Self::Offer => "offer",
        }
    }
}

impl FromStr for EventType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "status_change" => Ok(Self::StatusChange),
            "note" => Ok(Self::Note),
            "interview" => Ok(Self::Interview),
            "offer" => Ok(Self::Offer),
            _ => Err(UnknownVariant::new("type", value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {field} value '{value}'")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VacancyId(pub String);

impl VacancyId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VacancyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

/// A tracked job posting together with its current pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vacancy {
    pub id: VacancyId,
    pub created_at: NaiveDateTime,
    pub company: String,
    pub position: String,
    pub location: Option<String>,
    pub work_format: Option<WorkFormat>,
    pub link: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub currency: Option<String>,
    pub source: Option<String>,
    pub contacts: Option<String>,
    pub stage: Stage,
    pub notes: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl Vacancy {
    /// Builds a fresh vacancy; the stage always starts at `new`.
    pub fn from_draft(id: VacancyId, draft: VacancyDraft, now: NaiveDateTime) -> Self {
        let mut vacancy = Self {
            id,
            created_at: now,
            company: String::new(),
            position: String::new(),
            location: None,
            work_format: None,
            link: None,
            salary_min: None,
            salary_max: None,
            currency: None,
            source: None,
            contacts: None,
            stage: Stage::New,
            notes: None,
            updated_at: now,
        };
        vacancy.apply_draft(draft, now);
        vacancy
    }

    /// Replaces every descriptive field; identity, stage and creation time are untouched.
    pub fn apply_draft(&mut self, draft: VacancyDraft, now: NaiveDateTime) {
        let VacancyDraft {
            company,
            position,
            location,
            work_format,
            link,
            salary_min,
            salary_max,
            currency,
            source,
            contacts,
            notes,
        } = draft;

        self.company = company;
        self.position = position;
        self.location = location;
        self.work_format = work_format;
        self.link = link;
        self.salary_min = salary_min;
        self.salary_max = salary_max;
        self.currency = currency;
        self.source = source;
        self.contacts = contacts;
        self.notes = notes;
        self.updated_at = now;
    }
}

/// Create/update payload for a vacancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacancyDraft {
    pub company: String,
    pub position: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default = "default_work_format")]
    pub work_format: Option<WorkFormat>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub contacts: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl VacancyDraft {
    pub fn new(company: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            position: position.into(),
            location: None,
            work_format: default_work_format(),
            link: None,
            salary_min: None,
            salary_max: None,
            currency: None,
            source: None,
            contacts: None,
            notes: None,
        }
    }
}

fn default_work_format() -> Option<WorkFormat> {
    Some(WorkFormat::Remote)
}

/// Immutable record of something that happened to a vacancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub vacancy_id: VacancyId,
    pub timestamp: NaiveDateTime,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub stage_from: Option<Stage>,
    pub stage_to: Option<Stage>,
    pub comment: Option<String>,
}

impl Event {
    pub fn status_change(
        id: EventId,
        vacancy_id: VacancyId,
        timestamp: NaiveDateTime,
        stage_from: Option<Stage>,
        stage_to: Stage,
        comment: Option<String>,
    ) -> Self {
        Self {
            id,
            vacancy_id,
            timestamp,
            kind: EventType::StatusChange,
            stage_from,
            stage_to: Some(stage_to),
            comment,
        }
    }
}

/// Payload for manually logged activity (notes, interviews, offers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub stage_from: Option<Stage>,
    #[serde(default)]
    pub stage_to: Option<Stage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 2)
            .expect("valid date")
            .and_hms_opt(12, 0, 0)
            .expect("valid time")
    }

    #[test]
    fn stage_parses_only_known_values() {
        assert_eq!("interview".parse::<Stage>(), Ok(Stage::Interview));
        assert_eq!(" closed ".parse::<Stage>(), Ok(Stage::Closed));
        let err = "Interview".parse::<Stage>().expect_err("case sensitive");
        assert_eq!(err.field, "stage");
        assert!(err.to_string().contains("Interview"));
    }

    #[test]
    fn draft_defaults_work_format_to_remote_when_omitted() {
        let draft: VacancyDraft =
            serde_json::from_str(r#"{"company":"Acme","position":"Engineer"}"#)
                .expect("minimal draft parses");
        assert_eq!(draft.work_format, Some(WorkFormat::Remote));

        let draft: VacancyDraft = serde_json::from_str(
            r#"{"company":"Acme","position":"Engineer","work_format":null}"#,
        )
        .expect("explicit null parses");
        assert_eq!(draft.work_format, None);
    }

    #[test]
    fn from_draft_forces_new_stage_and_equal_timestamps() {
        let mut draft = VacancyDraft::new("Acme", "Engineer");
        draft.salary_min = Some(5000.0);
        let vacancy = Vacancy::from_draft(VacancyId("v1".to_string()), draft, noon());

        assert_eq!(vacancy.stage, Stage::New);
        assert_eq!(vacancy.created_at, vacancy.updated_at);
        assert_eq!(vacancy.salary_min, Some(5000.0));
    }

    #[test]
    fn event_serializes_kind_as_type() {
        let event = Event::status_change(
            EventId("e1".to_string()),
            VacancyId("v1".to_string()),
            noon(),
            None,
            Stage::New,
            None,
        );
        let value = serde_json::to_value(&event).expect("serializes");
        assert_eq!(value["type"], "status_change");
        assert_eq!(value["vacancy_id"], "v1");
        assert!(value["stage_from"].is_null());
        assert_eq!(value["stage_to"], "new");
    }
}
