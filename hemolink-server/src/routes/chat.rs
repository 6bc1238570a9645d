// hemolink-server/src/routes/chat.rs

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::{acting_user, ApiError};
use crate::state::AppState;
use hemolink_common::models::chat::ChatMessage;

pub async fn conversation(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let me = acting_user(&headers)?;
    Ok(Json(state.chat.conversation(me, user_id).await?))
}

#[derive(Deserialize)]
pub struct SendForm {
    pub message: String,
}

pub async fn send(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    headers: HeaderMap,
    Json(form): Json<SendForm>,
) -> Result<(StatusCode, Json<ChatMessage>), ApiError> {
    let me = acting_user(&headers)?;
    let message = state.chat.send_message(me, user_id, &form.message).await?;
    Ok((StatusCode::CREATED, Json(message)))
}
