// hemolink-server/src/routes/notifications.rs

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use uuid::Uuid;

use super::{acting_user, ApiError, Flash};
use crate::state::AppState;
use hemolink_common::models::notification::Notification;

pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let me = acting_user(&headers)?;
    Ok(Json(state.notifications.list_for_user(me).await?))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Flash>, ApiError> {
    state.notifications.mark_read(id).await?;
    Ok(Json(Flash::new("notification marked as read")))
}
