// hemolink-server/src/routes/users.rs

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use uuid::Uuid;

use super::{acting_user, ApiError, Flash};
use crate::state::AppState;
use hemolink_common::models::user::{NewUser, User};
use hemolink_core::services::FollowLists;

pub async fn create(
    State(state): State<AppState>,
    Json(form): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.users.create_user(&form).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.get_user(id).await?))
}

pub async fn follow(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Flash>, ApiError> {
    let me = acting_user(&headers)?;
    state.users.follow(me, id).await?;
    Ok(Json(Flash::new("now following")))
}

pub async fn unfollow(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Flash>, ApiError> {
    let me = acting_user(&headers)?;
    state.users.unfollow(me, id).await?;
    Ok(Json(Flash::new("unfollowed")))
}

pub async fn follow_lists(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FollowLists>, ApiError> {
    let me = acting_user(&headers)?;
    Ok(Json(state.users.follow_lists(me).await?))
}
