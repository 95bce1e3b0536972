use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ==============================================================================
// AVAILABILITY
// ==============================================================================

/// A weekly availability window, both ends encoded as 24-hour `HHMM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

impl TimeWindow {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Canonical availability: lowercase weekday name -> window.
pub type Availability = BTreeMap<String, TimeWindow>;

/// Availability as it arrives from clients or older data: any key casing,
/// times with or without a colon, either end possibly missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTimeWindow {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl RawTimeWindow {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: Some(start.to_string()),
            end: Some(end.to_string()),
        }
    }
}

pub type RawAvailability = BTreeMap<String, RawTimeWindow>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeField {
    Start,
    End,
}

impl fmt::Display for TimeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeField::Start => write!(f, "start"),
            TimeField::End => write!(f, "end"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AvailabilityIssueKind {
    #[error("{field} time is missing")]
    MissingTime { field: TimeField },

    #[error("{field} time '{value}' is not a valid HHMM value")]
    MalformedTime { field: TimeField, value: String },
}

/// An availability entry the normalizer could not canonicalize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityIssue {
    pub day: String,
    #[serde(flatten)]
    pub kind: AvailabilityIssueKind,
}

impl fmt::Display for AvailabilityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.day, self.kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedAvailability {
    pub availability: Availability,
    pub rejected: Vec<AvailabilityIssue>,
}

// ==============================================================================
// CALENDAR
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResource {
    pub doctor_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_title: Option<String>,
}

/// A dated occurrence of a doctor's weekly window. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub resource: EventResource,
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    #[error("'{day}' is not a recognized weekday")]
    UnknownWeekday { day: String },

    #[error("{field} time '{value}' is not a valid HHMM value")]
    MalformedTime { field: TimeField, value: String },

    #[error("'{day}' repeats a weekday already on the calendar")]
    DuplicateWeekday { day: String },

    #[error("next '{day}' falls outside the supported calendar range")]
    DateOutOfRange { day: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedEntry {
    pub doctor_name: String,
    pub day: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarProjection {
    pub events: Vec<CalendarEvent>,
    pub skipped: Vec<SkippedEntry>,
}

// ==============================================================================
// DIRECTORY RECORDS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ar,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Ar];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = DoctorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ar" => Ok(Language::Ar),
            other => Err(DoctorError::UnsupportedLanguage(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedContent {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorRecord {
    pub id: Uuid,
    pub localized: BTreeMap<Language, LocalizedContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub availability: Availability,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DoctorRecord {
    /// Content for `language`, falling back to English when missing.
    pub fn content(&self, language: Language) -> Option<&LocalizedContent> {
        self.localized
            .get(&language)
            .or_else(|| self.localized.get(&Language::En))
    }
}

/// The persisted directory: one document, both languages, display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryDocument {
    #[serde(default)]
    pub doctors: Vec<DoctorRecord>,
}

// ==============================================================================
// REQUEST / RESPONSE DTOs
// ==============================================================================

/// Body of `/add-doctor` and `/update-doctor/{id}`: the admin form's
/// flattened bilingual fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertDoctorRequest {
    pub name_en: String,
    pub title_en: String,
    #[serde(default)]
    pub description_en: String,
    pub name_ar: String,
    pub title_ar: String,
    #[serde(default)]
    pub description_ar: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub availability: Option<RawAvailability>,
}

impl UpsertDoctorRequest {
    pub fn localized(&self) -> BTreeMap<Language, LocalizedContent> {
        BTreeMap::from([
            (
                Language::En,
                LocalizedContent {
                    name: self.name_en.trim().to_string(),
                    title: self.title_en.trim().to_string(),
                    description: self.description_en.trim().to_string(),
                },
            ),
            (
                Language::Ar,
                LocalizedContent {
                    name: self.name_ar.trim().to_string(),
                    title: self.title_ar.trim().to_string(),
                    description: self.description_ar.trim().to_string(),
                },
            ),
        ])
    }
}

/// Flattened bilingual listing row, the shape the admin form reads back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorSummary {
    pub id: Uuid,
    pub name_en: String,
    pub title_en: String,
    pub description_en: String,
    pub name_ar: String,
    pub title_ar: String,
    pub description_ar: String,
    pub image: Option<String>,
    pub availability: Availability,
}

impl From<&DoctorRecord> for DoctorSummary {
    fn from(record: &DoctorRecord) -> Self {
        let en = record.content(Language::En).cloned().unwrap_or_default();
        let ar = record.content(Language::Ar).cloned().unwrap_or_default();

        Self {
            id: record.id,
            name_en: en.name,
            title_en: en.title,
            description_en: en.description,
            name_ar: ar.name,
            title_ar: ar.title,
            description_ar: ar.description,
            image: record.image.clone(),
            availability: record.availability.clone(),
        }
    }
}

/// One doctor in a single language, the entry shape of the locale listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedDoctorEntry {
    pub id: Uuid,
    pub name: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub availability: Availability,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Invalid doctor id: {0}")]
    InvalidId(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Store(#[from] shared_database::StoreError),
}
