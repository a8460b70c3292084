use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use opsched_api::ApiError;
use opsched_core::{Schedule, ScheduleDraft, ScheduleStatus, now_utc};
use opsched_storage::{ScheduleStore, ScheduleUpdate};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Restrict the listing to schedules registered by this user.
    pub user: Option<String>,
}

pub async fn create_schedule(
    State(state): State<AppState>,
    Json(draft): Json<ScheduleDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let schedule = draft.build(now_utc())?;
    let stored = state.schedules.create(schedule).await?;
    tracing::info!(
        schedule_id = %stored.schedule.id,
        patient = %stored.schedule.patient_name,
        "schedule created"
    );
    Ok((StatusCode::CREATED, Json(stored.schedule)))
}

pub async fn list_schedules(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Schedule>>, ApiError> {
    let stored = match query.user.as_deref() {
        Some(user) => state.schedules.list_by_user(user).await?,
        None => state.schedules.list().await?,
    };
    Ok(Json(stored.into_iter().map(|s| s.schedule).collect()))
}

pub async fn read_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Schedule>, ApiError> {
    let stored = state
        .schedules
        .fetch(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Schedule not found: {id}")))?;
    Ok(Json(stored.schedule))
}

pub async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(fields): Json<Map<String, Value>>,
) -> Result<Json<Schedule>, ApiError> {
    let mut update = ScheduleUpdate::new();
    for (field, value) in fields {
        update = update.set_field(field, value)?;
    }
    let committed = state.schedules.commit(&id, update, None).await?;
    Ok(Json(committed.schedule))
}

pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.schedules.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    #[serde(rename = "newStatus")]
    pub new_status: ScheduleStatus,
    #[serde(rename = "changedBy")]
    pub changed_by: String,
    #[serde(default)]
    pub reason: String,
}

pub async fn transition_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<TransitionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .lifecycle
        .transition(&id, request.new_status, &request.changed_by, &request.reason)
        .await?;
    Ok(Json(json!({ "ok": true })))
}
