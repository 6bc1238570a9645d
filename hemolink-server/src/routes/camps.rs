// hemolink-server/src/routes/camps.rs

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{acting_user, ApiError};
use crate::state::AppState;
use hemolink_common::models::blood_camp::{BloodCamp, DashboardSummary, NewBloodCamp};

#[derive(Deserialize)]
pub struct CampQuery {
    pub city: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<CampQuery>,
) -> Result<Json<Vec<BloodCamp>>, ApiError> {
    let today = Utc::now().date_naive();
    Ok(Json(
        state.camps.list_camps(today, query.city.as_deref()).await?,
    ))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<NewBloodCamp>,
) -> Result<(StatusCode, Json<BloodCamp>), ApiError> {
    let creator = acting_user(&headers)?;
    let camp = state.camps.create_camp(creator, &form).await?;
    Ok((StatusCode::CREATED, Json(camp)))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BloodCamp>, ApiError> {
    Ok(Json(state.camps.get_camp(id).await?))
}

pub async fn dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>, ApiError> {
    let today = Utc::now().date_naive();
    Ok(Json(state.camps.dashboard(today).await?))
}
