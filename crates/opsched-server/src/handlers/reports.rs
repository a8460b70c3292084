use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use opsched_api::ApiError;
use opsched_reports::DateRange;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: String,
    pub end: String,
}

impl RangeQuery {
    fn into_range(self) -> Result<DateRange, ApiError> {
        Ok(DateRange::new(self.start, self.end)?)
    }
}

pub async fn ot_utilization(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let range = query.into_range()?;
    Ok(Json(state.reports.ot_utilization(&range).await?))
}

pub async fn surgery_distribution(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let range = query.into_range()?;
    Ok(Json(state.reports.surgery_distribution(&range).await?))
}

pub async fn resource_demand(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let range = query.into_range()?;
    Ok(Json(state.reports.resource_demand(&range).await?))
}

pub async fn schedule_volatility(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let range = query.into_range()?;
    Ok(Json(state.reports.schedule_volatility(&range).await?))
}
