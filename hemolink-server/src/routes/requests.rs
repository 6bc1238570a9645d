// hemolink-server/src/routes/requests.rs

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{acting_user, ApiError, Flash};
use crate::state::AppState;
use hemolink_common::models::blood_request::{BloodRequest, NewBloodRequest};

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<BloodRequest>>, ApiError> {
    Ok(Json(state.requests.list_active().await?))
}

pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<NewBloodRequest>,
) -> Result<(StatusCode, Json<BloodRequest>), ApiError> {
    let requester = acting_user(&headers)?;
    let request = state.requests.create_request(requester, &form).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn accept(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Flash>, ApiError> {
    let donor = acting_user(&headers)?;
    state.requests.accept_request(id, donor, Utc::now()).await?;
    Ok(Json(Flash::new(
        "OTP and donor details sent to the requester; proceed to verification",
    )))
}

#[derive(Deserialize)]
pub struct VerifyForm {
    pub otp: String,
}

pub async fn verify(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<VerifyForm>,
) -> Result<Json<Flash>, ApiError> {
    state.requests.verify_otp(id, &form.otp, Utc::now()).await?;
    Ok(Json(Flash::new(
        "OTP verified, donor confirmed and request closed",
    )))
}
