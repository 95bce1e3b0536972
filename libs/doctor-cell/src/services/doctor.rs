use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{
    Availability, CalendarProjection, DoctorError, DoctorRecord, Language, LocalizedContent,
    LocalizedDoctorEntry, UpsertDoctorRequest,
};
use crate::services::availability::{normalize_availability, unknown_weekdays};
use crate::services::calendar::{project_calendar_events, sort_events_by_start, LocalizedDoctor};
use crate::state::{AppState, DirectoryStore};

pub struct DoctorService {
    store: Arc<DirectoryStore>,
}

pub fn parse_doctor_id(raw: &str) -> Result<Uuid, DoctorError> {
    Uuid::parse_str(raw.trim()).map_err(|_| DoctorError::InvalidId(raw.to_string()))
}

impl DoctorService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    pub fn with_store(store: Arc<DirectoryStore>) -> Self {
        Self { store }
    }

    /// All doctors in display order.
    pub async fn list_doctors(&self) -> Result<Vec<DoctorRecord>, DoctorError> {
        debug!("Listing doctors");
        Ok(self.store.load().await?.doctors)
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<DoctorRecord, DoctorError> {
        debug!("Fetching doctor: {}", doctor_id);

        self.store
            .load()
            .await?
            .doctors
            .into_iter()
            .find(|d| d.id == doctor_id)
            .ok_or(DoctorError::NotFound)
    }

    /// Create a doctor under a freshly generated id.
    pub async fn create_doctor(
        &self,
        request: UpsertDoctorRequest,
    ) -> Result<DoctorRecord, DoctorError> {
        debug!("Creating doctor: {}", request.name_en);

        let (localized, availability) = validate_request(&request)?;
        let now = Utc::now();

        let record = self
            .store
            .update(|document| -> Result<DoctorRecord, DoctorError> {
                let mut id = Uuid::new_v4();
                while document.doctors.iter().any(|d| d.id == id) {
                    id = Uuid::new_v4();
                }

                let record = DoctorRecord {
                    id,
                    localized,
                    image: normalize_image(request.image),
                    availability,
                    created_at: now,
                    updated_at: now,
                };
                document.doctors.push(record.clone());
                Ok(record)
            })
            .await?;

        info!("Doctor created with ID: {}", record.id);
        Ok(record)
    }

    /// Replace a doctor's content in both languages at once.
    ///
    /// When the request carries no availability the stored schedule is kept.
    pub async fn update_doctor(
        &self,
        doctor_id: Uuid,
        request: UpsertDoctorRequest,
    ) -> Result<DoctorRecord, DoctorError> {
        debug!("Updating doctor: {}", doctor_id);

        let (localized, availability) = validate_request(&request)?;
        let replace_availability = request.availability.is_some();

        let record = self
            .store
            .update(|document| -> Result<DoctorRecord, DoctorError> {
                let doctor = document
                    .doctors
                    .iter_mut()
                    .find(|d| d.id == doctor_id)
                    .ok_or(DoctorError::NotFound)?;

                doctor.localized = localized;
                doctor.image = normalize_image(request.image);
                if replace_availability {
                    doctor.availability = availability;
                }
                doctor.updated_at = Utc::now();

                Ok(doctor.clone())
            })
            .await?;

        info!("Doctor updated: {}", doctor_id);
        Ok(record)
    }

    /// Remove a doctor. Other doctors keep their ids.
    pub async fn delete_doctor(&self, doctor_id: Uuid) -> Result<(), DoctorError> {
        debug!("Deleting doctor: {}", doctor_id);

        self.store
            .update(|document| -> Result<(), DoctorError> {
                let before = document.doctors.len();
                document.doctors.retain(|d| d.id != doctor_id);
                if document.doctors.len() == before {
                    return Err(DoctorError::NotFound);
                }
                Ok(())
            })
            .await?;

        info!("Doctor deleted: {}", doctor_id);
        Ok(())
    }

    /// The directory as a single language sees it.
    pub async fn localized_roster(
        &self,
        language: Language,
    ) -> Result<Vec<LocalizedDoctorEntry>, DoctorError> {
        let doctors = self.list_doctors().await?;

        Ok(doctors
            .iter()
            .map(|record| {
                let content = record.content(language).cloned().unwrap_or_default();
                LocalizedDoctorEntry {
                    id: record.id,
                    name: content.name,
                    title: content.title,
                    description: content.description,
                    image: record.image.clone(),
                    availability: record.availability.clone(),
                }
            })
            .collect())
    }

    /// Project the current roster onto the calendar, sorted by start.
    pub async fn calendar(
        &self,
        language: Language,
        now: NaiveDateTime,
        doctor_name: Option<&str>,
    ) -> Result<CalendarProjection, DoctorError> {
        let doctors = self.list_doctors().await?;
        let roster: Vec<LocalizedDoctor<'_>> = doctors
            .iter()
            .map(|record| LocalizedDoctor::new(record, language))
            .collect();

        let mut projection = project_calendar_events(&roster, now);
        if let Some(name) = doctor_name.map(str::trim).filter(|n| !n.is_empty()) {
            projection.retain_doctor(name);
        }
        sort_events_by_start(&mut projection.events);

        Ok(projection)
    }
}

fn normalize_image(image: Option<String>) -> Option<String> {
    image
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
}

fn validate_request(
    request: &UpsertDoctorRequest,
) -> Result<(BTreeMap<Language, LocalizedContent>, Availability), DoctorError> {
    let localized = request.localized();

    let mut problems = Vec::new();
    for language in Language::ALL {
        let content = localized.get(&language);
        if content.map_or(true, |c| c.name.is_empty()) {
            problems.push(format!("name_{} is required", language));
        }
        if content.map_or(true, |c| c.title.is_empty()) {
            problems.push(format!("title_{} is required", language));
        }
    }

    let normalized = normalize_availability(request.availability.as_ref());
    problems.extend(normalized.rejected.iter().map(|issue| issue.to_string()));
    problems.extend(
        unknown_weekdays(&normalized.availability)
            .into_iter()
            .map(|day| format!("{}: not a recognized weekday", day)),
    );

    if !problems.is_empty() {
        return Err(DoctorError::ValidationError(problems.join("; ")));
    }

    Ok((localized, normalized.availability))
}
