use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use opsched_api::ApiError;
use opsched_core::{Doctor, DoctorDraft, now_utc};
use opsched_storage::{DoctorStore, DoctorUpdate};

use crate::state::AppState;

pub async fn create_doctor(
    State(state): State<AppState>,
    Json(draft): Json<DoctorDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let doctor = draft.build(now_utc())?;
    let created = state.doctors.create(doctor).await?;
    tracing::info!(doctor_id = %created.id, name = %created.name, "doctor added");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_doctors(
    State(state): State<AppState>,
) -> Result<Json<Vec<Doctor>>, ApiError> {
    Ok(Json(state.doctors.list().await?))
}

pub async fn read_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Doctor>, ApiError> {
    let doctor = state
        .doctors
        .fetch(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Doctor not found: {id}")))?;
    Ok(Json(doctor))
}

pub async fn update_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<DoctorUpdate>,
) -> Result<Json<Doctor>, ApiError> {
    Ok(Json(state.doctors.update(&id, update).await?))
}

pub async fn delete_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.doctors.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
