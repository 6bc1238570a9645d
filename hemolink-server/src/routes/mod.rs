// hemolink-server/src/routes/mod.rs

pub mod camps;
pub mod chat;
pub mod notifications;
pub mod requests;
pub mod users;

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::error;
use uuid::Uuid;

use crate::state::AppState;
use hemolink_common::Error;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/requests", get(requests::list).post(requests::create))
        .route("/requests/{id}/accept", post(requests::accept))
        .route("/requests/{id}/verify", post(requests::verify))
        .route("/notifications", get(notifications::list))
        .route("/notifications/{id}/read", post(notifications::mark_read))
        .route("/users", post(users::create))
        .route("/users/{id}", get(users::get_user))
        .route(
            "/users/{id}/follow",
            post(users::follow).delete(users::unfollow),
        )
        .route("/follows", get(users::follow_lists))
        .route("/chat/{user_id}", get(chat::conversation).post(chat::send))
        .route("/camps", get(camps::list).post(camps::create))
        .route("/camps/{id}", get(camps::detail))
        .route("/dashboard", get(camps::dashboard))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Flash-style JSON body shown to the user after a mutating call.
#[derive(Serialize)]
pub struct Flash {
    pub message: String,
}

impl Flash {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::OtpExpired(_) => StatusCode::GONE,
            Error::OtpMismatch(_) | Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self.0);
        }
        (status, Json(Flash::new(self.0.to_string()))).into_response()
    }
}

/// The acting user, from the `x-user-id` header. Stands in for the session
/// layer this service deliberately does not carry.
pub fn acting_user(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let raw = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError(Error::Validation("missing x-user-id header".to_string())))?;
    Uuid::parse_str(raw)
        .map_err(|_| ApiError(Error::Validation("x-user-id is not a valid UUID".to_string())))
}
