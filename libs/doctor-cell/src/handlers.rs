use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{DoctorError, DoctorSummary, Language, UpsertDoctorRequest};
use crate::services::doctor::{parse_doctor_id, DoctorService};
use crate::state::AppState;

impl From<DoctorError> for AppError {
    fn from(error: DoctorError) -> Self {
        match error {
            DoctorError::NotFound => AppError::NotFound(error.to_string()),
            DoctorError::InvalidId(_) | DoctorError::UnsupportedLanguage(_) => {
                AppError::BadRequest(error.to_string())
            }
            DoctorError::ValidationError(msg) => AppError::ValidationError(msg),
            DoctorError::Store(e) => AppError::Storage(e.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub lang: Option<String>,
    pub doctor: Option<String>,
    /// Anchor instant, `YYYY-MM-DDTHH:MM:SS`. Defaults to the local clock.
    pub now: Option<NaiveDateTime>,
}

fn parse_language(raw: Option<&str>) -> Result<Language, AppError> {
    match raw {
        Some(code) => Ok(code.parse::<Language>()?),
        None => Ok(Language::En),
    }
}

// ==============================================================================
// DIRECTORY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let doctors: Vec<DoctorSummary> = doctor_service
        .list_doctors()
        .await?
        .iter()
        .map(DoctorSummary::from)
        .collect();

    Ok(Json(json!(doctors)))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = parse_doctor_id(&doctor_id)?;
    let doctor_service = DoctorService::new(&state);

    let doctor = doctor_service.get_doctor(doctor_id).await?;

    Ok(Json(json!(DoctorSummary::from(&doctor))))
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpsertDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let doctor_service = DoctorService::new(&state);

    let doctor = doctor_service.create_doctor(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Doctor added successfully",
            "id": doctor.id
        })),
    ))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<String>,
    Json(request): Json<UpsertDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = parse_doctor_id(&doctor_id)?;
    let doctor_service = DoctorService::new(&state);

    doctor_service.update_doctor(doctor_id, request).await?;

    Ok(Json(json!({
        "message": "Doctor updated successfully"
    })))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let doctor_id = parse_doctor_id(&doctor_id)?;
    let doctor_service = DoctorService::new(&state);

    doctor_service.delete_doctor(doctor_id).await?;

    Ok(Json(json!({
        "message": "Doctor deleted successfully"
    })))
}

// ==============================================================================
// LOCALE & CALENDAR HANDLERS
// ==============================================================================

/// Per-language listing in the `doctors.list` shape the front-end's
/// translation bundles use.
#[axum::debug_handler]
pub async fn get_locale_doctors(
    State(state): State<Arc<AppState>>,
    Path(lang): Path<String>,
) -> Result<Json<Value>, AppError> {
    let language = parse_language(Some(&lang))?;
    let doctor_service = DoctorService::new(&state);

    let list = doctor_service.localized_roster(language).await?;

    Ok(Json(json!({
        "doctors": {
            "list": list
        }
    })))
}

#[axum::debug_handler]
pub async fn get_calendar_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Value>, AppError> {
    let language = parse_language(query.lang.as_deref())?;
    let now = query.now.unwrap_or_else(|| Local::now().naive_local());
    let doctor_service = DoctorService::new(&state);

    let projection = doctor_service
        .calendar(language, now, query.doctor.as_deref())
        .await?;

    Ok(Json(json!({
        "events": projection.events,
        "skipped": projection.skipped,
        "total": projection.events.len(),
        "anchor": now
    })))
}
